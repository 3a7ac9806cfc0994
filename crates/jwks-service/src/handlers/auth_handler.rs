use crate::errors::JwksError;
use crate::models::{TokenFlow, TokenResponse};
use crate::observability::metrics::{record_error, record_token_issuance};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    /// Present (with any value, including empty) to request an expired token.
    pub expired: Option<String>,
}

impl AuthQuery {
    pub fn wants_expired(&self) -> bool {
        self.expired.is_some()
    }
}

/// Handle token request
///
/// POST /auth[?expired]
///
/// No request body is required. Returns `{"token": "<jwt>"}`.
#[instrument(name = "jwks.token.issue", skip_all, fields(flow, status))]
pub async fn handle_issue_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<TokenResponse>, JwksError> {
    let start = Instant::now();
    let flow = TokenFlow::from_want_expired(query.wants_expired());

    let result = state.issuer.issue_token(query.wants_expired());

    let status = if result.is_ok() { "success" } else { "error" };
    let span = tracing::Span::current();
    span.record("flow", flow.as_str());
    span.record("status", status);
    record_token_issuance(flow.as_str(), status, start.elapsed());

    match result {
        Ok(token) => Ok(Json(token)),
        Err(e) => {
            tracing::warn!(
                target: "jwks.tokens",
                error = %e,
                flow = flow.as_str(),
                "Token issuance failed"
            );
            record_error("issue_token", e.code(), e.status_code().as_u16());
            Err(e)
        }
    }
}
