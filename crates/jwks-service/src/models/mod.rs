use serde::{Deserialize, Serialize};

/// Token response for `POST /auth`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Liveness response for `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// JWKS response (RFC 7517)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

/// JSON Web Key (RFC 7517, RSA public parameters per RFC 7518 §6.3.1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String, // Key Type ("RSA")
    pub kid: String, // Key ID
    #[serde(rename = "use")]
    pub use_: String, // Public key use ("sig")
    pub alg: String, // Algorithm ("RS256")
    pub n: String,   // Modulus (base64url, unpadded)
    pub e: String,   // Exponent (base64url, unpadded)
}

/// Which class of key a token request is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFlow {
    /// Signed with the active key, valid for the configured lifetime
    Active,
    /// Signed with the most recently expired key, already expired
    Expired,
}

impl TokenFlow {
    pub fn from_want_expired(want_expired: bool) -> Self {
        if want_expired {
            TokenFlow::Expired
        } else {
            TokenFlow::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenFlow::Active => "active",
            TokenFlow::Expired => "expired",
        }
    }
}
