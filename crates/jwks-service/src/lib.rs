//! JWKS Issuer Service Library
//!
//! Issues RS256-signed JWTs and publishes the matching public keys as a
//! JSON Web Key Set so relying parties can verify them.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - RSA key generation, JWK encoding and JWT signing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `models` - Wire models (JWKS, token and health responses)
//! - `observability` - Prometheus metrics
//! - `repositories` - In-memory key store
//! - `routes` - Router and shared application state
//! - `services` - Key management and token issuance

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
