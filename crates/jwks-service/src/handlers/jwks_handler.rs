use crate::models::Jwks;
use crate::observability::metrics::record_jwks_request;
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    http::header::{HeaderMap, HeaderValue, CACHE_CONTROL},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
pub struct JwksQuery {
    /// Restrict the result to this key id (zero or one entries).
    pub kid: Option<String>,
}

/// Handle JWKS request
///
/// GET /jwks, GET /.well-known/jwks.json
///
/// Returns the unexpired public keys in JWKS format (RFC 7517). Always 200,
/// including when no key matches.
#[instrument(name = "jwks.keys.get", skip_all, fields(filtered, key_count))]
pub async fn handle_get_jwks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JwksQuery>,
) -> (HeaderMap, Json<Jwks>) {
    let filtered = query.kid.is_some();
    let jwks = state.issuer.publish_keys(query.kid.as_deref());

    let span = tracing::Span::current();
    span.record("filtered", filtered);
    span.record("key_count", jwks.keys.len());
    record_jwks_request(filtered);

    // The set shrinks as keys expire, so it must not be served from a cache
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    (headers, Json(jwks))
}
