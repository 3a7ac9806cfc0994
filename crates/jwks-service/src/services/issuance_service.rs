//! The two externally visible operations: publishing keys and issuing tokens.

use crate::config::Config;
use crate::errors::JwksError;
use crate::models::{Jwks, TokenFlow, TokenResponse};
use crate::repositories::key_store::KeyStore;
use crate::services::key_management_service;
use crate::services::token_service::{self, TokenSettings};
use chrono::Utc;
use std::sync::Arc;

/// Request-facing interface over a key store.
///
/// The plain methods read the wall clock once; the `_at` variants take the
/// timestamp explicitly so selection can be tested deterministically.
pub trait KeyIssuer: Send + Sync {
    /// Public key set of unexpired keys, optionally narrowed to one `kid`.
    fn publish_keys_at(&self, kid_filter: Option<&str>, now: i64) -> Jwks;

    /// Sign a token with the active key, or with the most recently expired
    /// key when `want_expired` is set.
    fn issue_token_at(&self, want_expired: bool, now: i64) -> Result<TokenResponse, JwksError>;

    fn publish_keys(&self, kid_filter: Option<&str>) -> Jwks {
        self.publish_keys_at(kid_filter, Utc::now().timestamp())
    }

    fn issue_token(&self, want_expired: bool) -> Result<TokenResponse, JwksError> {
        self.issue_token_at(want_expired, Utc::now().timestamp())
    }
}

/// [`KeyIssuer`] backed by a shared [`KeyStore`].
#[derive(Debug, Clone)]
pub struct IssuanceService {
    store: Arc<KeyStore>,
    settings: TokenSettings,
}

impl IssuanceService {
    pub fn new(store: Arc<KeyStore>, settings: TokenSettings) -> Self {
        Self { store, settings }
    }

    pub fn from_config(store: Arc<KeyStore>, config: &Config) -> Self {
        Self::new(store, TokenSettings::from(config))
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        &self.store
    }
}

impl KeyIssuer for IssuanceService {
    fn publish_keys_at(&self, kid_filter: Option<&str>, now: i64) -> Jwks {
        key_management_service::get_jwks(&self.store, kid_filter, now)
    }

    fn issue_token_at(&self, want_expired: bool, now: i64) -> Result<TokenResponse, JwksError> {
        token_service::issue_token(
            &self.store,
            &self.settings,
            TokenFlow::from_want_expired(want_expired),
            now,
        )
    }
}
