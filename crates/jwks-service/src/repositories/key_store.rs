//! In-memory signing key store.
//!
//! Records are insert-only and live for the lifetime of the process. Whether a
//! record is active or expired is never stored: every read compares
//! `expires_at` against the caller-supplied `now`, so the same store naturally
//! reclassifies keys as time passes.

use crate::crypto::{self, SigningKeyPair, SIGNING_ALGORITHM};
use crate::errors::JwksError;
use crate::models::JsonWebKey;
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// A signing key tagged with its identifier and expiry.
pub struct KeyRecord {
    kid: String,
    key_pair: SigningKeyPair,
    expires_at: i64,
}

impl KeyRecord {
    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn key_pair(&self) -> &SigningKeyPair {
        &self.key_pair
    }

    /// Expiry as seconds since the Unix epoch.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// A key is active strictly before its expiry instant.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.expires_at > now
    }

    /// Public JWK descriptor for this record.
    pub fn to_jwk(&self) -> JsonWebKey {
        JsonWebKey {
            kty: "RSA".to_string(),
            kid: self.kid.clone(),
            use_: "sig".to_string(),
            alg: SIGNING_ALGORITHM.to_string(),
            n: self.key_pair.modulus_b64(),
            e: self.key_pair.exponent_b64(),
        }
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("kid", &self.kid)
            .field("key_pair", &self.key_pair)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Shared, concurrency-safe collection of [`KeyRecord`]s.
///
/// Records are kept in insertion order, which is also the tie-break for
/// selection when two records share an `expires_at`.
#[derive(Debug, Default)]
pub struct KeyStore {
    records: RwLock<Vec<Arc<KeyRecord>>>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh key pair and store it under a new `kid`.
    ///
    /// The key pair is generated before the write lock is taken, so slow
    /// generation never stalls readers.
    #[instrument(skip(self))]
    pub fn generate_key(&self, expires_at: i64, bits: usize) -> Result<Arc<KeyRecord>, JwksError> {
        let key_pair = crypto::generate_signing_key(bits)?;
        Ok(self.insert_key(expires_at, key_pair))
    }

    /// Store an already generated key pair under a new `kid`.
    pub fn insert_key(&self, expires_at: i64, key_pair: SigningKeyPair) -> Arc<KeyRecord> {
        let record = Arc::new(KeyRecord {
            // v4 UUIDs make collisions within a process negligible
            kid: Uuid::new_v4().simple().to_string(),
            key_pair,
            expires_at,
        });

        self.records.write().push(Arc::clone(&record));

        tracing::debug!(
            target: "jwks.key_store",
            kid = %record.kid,
            expires_at = expires_at,
            "Signing key stored"
        );

        record
    }

    /// The active key expiring furthest in the future.
    pub fn get_active_key(&self, now: i64) -> Result<Arc<KeyRecord>, JwksError> {
        self.select_latest(|record| record.is_active_at(now))
            .ok_or(JwksError::NoActiveKey)
    }

    /// The most recently expired key.
    pub fn get_expired_key(&self, now: i64) -> Result<Arc<KeyRecord>, JwksError> {
        self.select_latest(|record| !record.is_active_at(now))
            .ok_or(JwksError::NoExpiredKey)
    }

    /// Exact lookup by `kid`, returning the record and whether it is expired at `now`.
    pub fn get_by_kid(&self, kid: &str, now: i64) -> Result<(Arc<KeyRecord>, bool), JwksError> {
        let records = self.records.read();
        records
            .iter()
            .find(|record| record.kid == kid)
            .map(|record| (Arc::clone(record), !record.is_active_at(now)))
            .ok_or_else(|| JwksError::UnknownKid(kid.to_string()))
    }

    /// Render public descriptors for every matching record, in insertion order.
    ///
    /// An unknown `kid_filter` yields an empty list rather than an error.
    pub fn render_key_set(
        &self,
        unexpired_only: bool,
        kid_filter: Option<&str>,
        now: i64,
    ) -> Vec<JsonWebKey> {
        let records = self.records.read();
        records
            .iter()
            .filter(|record| kid_filter.map_or(true, |kid| record.kid == kid))
            .filter(|record| !unexpired_only || record.is_active_at(now))
            .map(|record| record.to_jwk())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Highest `expires_at` among records matching `predicate`; first inserted wins ties.
    fn select_latest<F>(&self, predicate: F) -> Option<Arc<KeyRecord>>
    where
        F: Fn(&KeyRecord) -> bool,
    {
        let records = self.records.read();
        records
            .iter()
            .filter(|record| predicate(record))
            // min_by_key keeps the first of equal elements
            .min_by_key(|record| Reverse(record.expires_at))
            .map(Arc::clone)
    }
}
