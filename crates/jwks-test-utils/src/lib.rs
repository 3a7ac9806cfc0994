//! # JWKS Test Utilities
//!
//! Shared test utilities for the JWKS issuer service.
//!
//! This crate provides:
//! - A shared RSA key fixture (generated once per test process)
//! - Server test harness (TestJwksServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwks_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestJwksServer::spawn().await?;
//!     let token = server.issue_token(false).await?;
//!     let jwks = server.fetch_jwks().await?;
//!
//!     token.assert_valid_jwt().assert_verifies_with(&jwks);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
