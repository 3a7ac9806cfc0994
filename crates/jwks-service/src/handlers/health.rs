//! Liveness probe.

use crate::models::HealthResponse;
use axum::Json;

/// GET /health
///
/// Answers as long as the process can serve HTTP. Keys are provisioned before
/// the listener binds, so there is no separate readiness state.
#[tracing::instrument(skip_all, name = "jwks.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
