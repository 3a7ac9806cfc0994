use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default `iss` claim.
pub const DEFAULT_ISSUER: &str = "jwks-server";

/// Default `aud` claim.
pub const DEFAULT_AUDIENCE: &str = "fake-users";

/// Default `sub` claim.
pub const DEFAULT_SUBJECT: &str = "fake-user-123";

/// Default `scope` claim.
pub const DEFAULT_SCOPE: &str = "read:all";

/// Default lifetime of tokens signed with the active key (5 minutes).
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 300;

/// Maximum token lifetime (1 day).
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 86_400;

/// Default key lifetime (1 hour). The startup expired key is backdated by the same amount.
pub const DEFAULT_KEY_LIFETIME_SECONDS: i64 = 3600;

/// Maximum key lifetime (365 days).
pub const MAX_KEY_LIFETIME_SECONDS: i64 = 31_536_000;

/// Accepted RSA modulus sizes.
pub const ALLOWED_RSA_KEY_BITS: [usize; 3] = [2048, 3072, 4096];

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub issuer: String,
    pub audience: String,
    pub subject: String,
    pub scope: String,
    pub token_lifetime_seconds: i64,
    pub key_lifetime_seconds: i64,
    pub rsa_key_bits: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            token_lifetime_seconds: DEFAULT_TOKEN_LIFETIME_SECONDS,
            key_lifetime_seconds: DEFAULT_KEY_LIFETIME_SECONDS,
            rsa_key_bits: crate::crypto::DEFAULT_RSA_KEY_BITS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let string_var = |name: &str, default: String| -> Result<String, ConfigError> {
            match vars.get(name) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: "must not be empty".to_string(),
                }),
                Some(value) => Ok(value.clone()),
                None => Ok(default),
            }
        };

        let bind_address = string_var("BIND_ADDRESS", defaults.bind_address)?;
        let issuer = string_var("JWT_ISSUER", defaults.issuer)?;
        let audience = string_var("JWT_AUDIENCE", defaults.audience)?;
        let subject = string_var("JWT_SUBJECT", defaults.subject)?;
        let scope = string_var("JWT_SCOPE", defaults.scope)?;

        let token_lifetime_seconds = parse_var(
            vars,
            "TOKEN_LIFETIME_SECONDS",
            defaults.token_lifetime_seconds,
        )?;
        check_range(
            "TOKEN_LIFETIME_SECONDS",
            token_lifetime_seconds,
            1,
            MAX_TOKEN_LIFETIME_SECONDS,
        )?;

        let key_lifetime_seconds =
            parse_var(vars, "KEY_LIFETIME_SECONDS", defaults.key_lifetime_seconds)?;
        check_range(
            "KEY_LIFETIME_SECONDS",
            key_lifetime_seconds,
            1,
            MAX_KEY_LIFETIME_SECONDS,
        )?;

        let rsa_key_bits = parse_var(vars, "RSA_KEY_BITS", defaults.rsa_key_bits)?;
        if !ALLOWED_RSA_KEY_BITS.contains(&rsa_key_bits) {
            return Err(ConfigError::InvalidValue {
                name: "RSA_KEY_BITS".to_string(),
                reason: format!(
                    "{} is not one of {:?}",
                    rsa_key_bits, ALLOWED_RSA_KEY_BITS
                ),
            });
        }

        Ok(Config {
            bind_address,
            issuer,
            audience,
            subject,
            scope,
            token_lifetime_seconds,
            key_lifetime_seconds,
            rsa_key_bits,
        })
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("{} is outside {}..={}", value, min, max),
        })
    }
}
