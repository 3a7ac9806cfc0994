//! Observability module for the JWKS service
//!
//! Handlers and services use `#[instrument(skip_all)]` with explicit, bounded
//! fields. Key material and issued tokens never appear in logs or metric labels;
//! only `kid`s, flows and error codes do.

pub mod metrics;

pub use metrics::{
    init_metrics_recorder, record_error, record_jwks_request, record_key_generation,
    record_token_issuance,
};
