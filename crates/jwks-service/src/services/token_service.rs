use crate::config::Config;
use crate::crypto::{self, Claims};
use crate::errors::JwksError;
use crate::models::{TokenFlow, TokenResponse};
use crate::repositories::key_store::KeyStore;
use tracing::instrument;

/// Fixed claim values stamped into every issued token.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub issuer: String,
    pub audience: String,
    pub subject: String,
    pub scope: String,
    /// Lifetime of tokens signed with the active key.
    pub lifetime_seconds: i64,
}

impl From<&Config> for TokenSettings {
    fn from(config: &Config) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            subject: config.subject.clone(),
            scope: config.scope.clone(),
            lifetime_seconds: config.token_lifetime_seconds,
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Issue a signed token at `now`.
///
/// The active flow signs with the active key and expires `lifetime_seconds`
/// after `now`. The expired flow signs with the most recently expired key and
/// copies that key's expiry into `exp`, so the token is already expired.
/// A missing key class is reported as `NoActiveKey` / `NoExpiredKey`; the other
/// class is never substituted.
#[instrument(skip(store, settings), fields(kid))]
pub fn issue_token(
    store: &KeyStore,
    settings: &TokenSettings,
    flow: TokenFlow,
    now: i64,
) -> Result<TokenResponse, JwksError> {
    let (key, exp) = match flow {
        TokenFlow::Expired => {
            let key = store.get_expired_key(now)?;
            let exp = key.expires_at();
            (key, exp)
        }
        TokenFlow::Active => (store.get_active_key(now)?, now + settings.lifetime_seconds),
    };

    tracing::Span::current().record("kid", key.kid());

    let claims = Claims {
        sub: settings.subject.clone(),
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
        iat: now,
        exp,
        scope: settings.scope.clone(),
    };

    let token = crypto::sign_jwt(&claims, key.key_pair(), key.kid())?;

    tracing::debug!(
        target: "jwks.tokens",
        kid = %key.kid(),
        flow = flow.as_str(),
        exp = exp,
        "Token issued"
    );

    Ok(TokenResponse { token })
}
