use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwksError {
    /// No record with `expires_at > now` exists.
    #[error("No active (unexpired) signing key available")]
    NoActiveKey,

    /// No record with `expires_at <= now` exists.
    #[error("No expired signing key available")]
    NoExpiredKey,

    #[error("Unknown key id: {0}")]
    UnknownKid(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl JwksError {
    /// Stable machine-readable code carried in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            JwksError::NoActiveKey => "NO_ACTIVE_KEY",
            JwksError::NoExpiredKey => "NO_EXPIRED_KEY",
            JwksError::UnknownKid(_) => "UNKNOWN_KID",
            JwksError::Crypto(_) => "CRYPTO_ERROR",
            JwksError::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            JwksError::NoActiveKey => StatusCode::SERVICE_UNAVAILABLE,
            JwksError::NoExpiredKey | JwksError::UnknownKid(_) => StatusCode::NOT_FOUND,
            JwksError::Crypto(_) | JwksError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        let message = match &self {
            JwksError::NoActiveKey => "No active signing key is available".to_string(),
            JwksError::NoExpiredKey => "No expired signing key is available".to_string(),
            JwksError::UnknownKid(_) => "The requested key id is unknown".to_string(),
            // Primitive failure details stay in the logs
            JwksError::Crypto(_) => "An internal cryptographic error occurred".to_string(),
            JwksError::Internal => "An internal error occurred".to_string(),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
            },
        };

        (self.status_code(), Json(error_response)).into_response()
    }
}
