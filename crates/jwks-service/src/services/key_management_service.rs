use crate::config::Config;
use crate::crypto;
use crate::errors::JwksError;
use crate::models::Jwks;
use crate::observability::metrics::record_key_generation;
use crate::repositories::key_store::{KeyRecord, KeyStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Keys provisioned at startup.
#[derive(Debug, Clone)]
pub struct InitialKeys {
    pub active: Arc<KeyRecord>,
    pub expired: Arc<KeyRecord>,
}

/// Generate a key pair on the blocking pool and insert it into the store.
///
/// RSA generation is CPU-bound, so it runs off the async workers and outside
/// the store lock; only the insertion touches the lock.
#[instrument(skip(store))]
pub async fn generate_signing_key(
    store: &Arc<KeyStore>,
    expires_at: i64,
    bits: usize,
) -> Result<Arc<KeyRecord>, JwksError> {
    let start = Instant::now();

    let result = tokio::task::spawn_blocking(move || crypto::generate_signing_key(bits))
        .await
        .map_err(|e| {
            tracing::error!(target: "jwks.keys", error = %e, "Key generation task failed");
            JwksError::Internal
        })
        .and_then(|generated| generated);

    let status = if result.is_ok() { "success" } else { "error" };
    record_key_generation(status, start.elapsed());

    let key_pair = result?;
    let record = store.insert_key(expires_at, key_pair);

    tracing::info!(
        target: "jwks.keys",
        kid = %record.kid(),
        expires_at = expires_at,
        "Signing key generated"
    );

    Ok(record)
}

/// Provision the startup keys: one active key expiring `key_lifetime_seconds`
/// after `now`, and one key that expired the same amount before `now`.
///
/// Any failure here is fatal; the service must not serve without both.
#[instrument(skip_all)]
pub async fn initialize_signing_keys(
    store: &Arc<KeyStore>,
    config: &Config,
    now: i64,
) -> Result<InitialKeys, JwksError> {
    let lifetime = config.key_lifetime_seconds;
    let bits = config.rsa_key_bits;

    let (active, expired) = tokio::try_join!(
        generate_signing_key(store, now + lifetime, bits),
        generate_signing_key(store, now - lifetime, bits),
    )?;

    Ok(InitialKeys { active, expired })
}

/// Get JWKS (JSON Web Key Set) for public key distribution
///
/// Only keys unexpired at `now` are ever published, whatever the filter, so a
/// verifier trusting this document cannot accept a token signed by an expired key.
pub fn get_jwks(store: &KeyStore, kid_filter: Option<&str>, now: i64) -> Jwks {
    Jwks {
        keys: store.render_key_set(true, kid_filter, now),
    }
}
