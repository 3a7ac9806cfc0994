//! Shared cryptographic fixtures for testing
//!
//! RSA generation takes long enough that every test minting its own key
//! dominates suite runtime. One 2048-bit key pair is generated per test
//! process and cloned into every store a test builds.

use jwks_service::crypto::{self, SigningKeyPair, DEFAULT_RSA_KEY_BITS};
use jwks_service::repositories::{KeyRecord, KeyStore};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

static SHARED_KEY_PAIR: OnceLock<SigningKeyPair> = OnceLock::new();

/// Return the process-wide test key pair, generating it on first use.
///
/// # Example
/// ```rust,ignore
/// let key_pair = test_key_pair()?;
/// let record = store.insert_key(now + 60, key_pair);
/// ```
pub fn test_key_pair() -> Result<SigningKeyPair, FixtureError> {
    if let Some(key_pair) = SHARED_KEY_PAIR.get() {
        return Ok(key_pair.clone());
    }

    let generated = crypto::generate_signing_key(DEFAULT_RSA_KEY_BITS)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test key pair: {}", e)))?;

    // A concurrent caller may have won the race; either key is fine.
    Ok(SHARED_KEY_PAIR.get_or_init(|| generated).clone())
}

/// Build a store holding one record per entry of `expiries`, in order.
///
/// Returns the store with the inserted records so tests can refer to kids.
pub fn store_with_expiries(
    expiries: &[i64],
) -> Result<(Arc<KeyStore>, Vec<Arc<KeyRecord>>), FixtureError> {
    let key_pair = test_key_pair()?;
    let store = Arc::new(KeyStore::new());
    let records = expiries
        .iter()
        .map(|expires_at| store.insert_key(*expires_at, key_pair.clone()))
        .collect();
    Ok((store, records))
}
