//! HTTP routes for the JWKS service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::repositories::KeyStore;
use crate::services::{IssuanceService, KeyIssuer};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Publishes keys and issues tokens.
    pub issuer: Arc<dyn KeyIssuer>,
}

impl AppState {
    /// State whose issuer is an [`IssuanceService`] over `key_store`, stamping
    /// claims from `config`.
    pub fn new(config: &Config, key_store: Arc<KeyStore>) -> Self {
        Self {
            issuer: Arc::new(IssuanceService::from_config(key_store, config)),
        }
    }
}

/// Build the application routes.
///
/// - `/jwks`, `/.well-known/jwks.json` - Public key set (optional `kid` query)
/// - `/auth` - Token issuance (optional `expired` query flag)
/// - `/health` - Liveness probe
/// - `/metrics` - Prometheus metrics endpoint
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/jwks", get(handlers::handle_get_jwks))
        .route("/.well-known/jwks.json", get(handlers::handle_get_jwks))
        .route("/auth", post(handlers::handle_issue_token))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
