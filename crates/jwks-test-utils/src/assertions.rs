//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for issued tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use jwks_service::models::Jwks;
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub scope: String,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

fn header_of(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0)).expect("Failed to parse JWT header")
}

fn claims_of(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("fake-user-123")
///     .assert_verifies_with(&jwks);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed RS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token was signed by the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token expires within the specified seconds
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Assert that the token's `exp` is not after the current time
    fn assert_expired(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token's issuer and audience match
    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self;

    /// Assert that the key named by the token's `kid` is in `jwks` and
    /// verifies the signature
    fn assert_verifies_with(&self, jwks: &Jwks) -> &Self;

    /// Assert that `jwks` has no key for the token's `kid`
    fn assert_kid_not_published(&self, jwks: &Jwks) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = header_of(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(header.kid.is_some(), "Expected a kid in the JWT header");

        let claims = claims_of(self);
        assert!(claims.iat > 0, "Expected a positive iat, got {}", claims.iat);

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header_of(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = claims_of(self);
        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;

        // Allow 5-second tolerance for slow test runners
        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_expired(&self) -> &Self {
        let claims = claims_of(self);
        let now = chrono::Utc::now().timestamp();
        assert!(
            claims.exp <= now,
            "Expected an expired token, but exp {} is after now {}",
            claims.exp,
            now
        );

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );

        self
    }

    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(claims.iss, issuer, "Unexpected issuer");
        assert_eq!(claims.aud, audience, "Unexpected audience");
        assert!(!claims.scope.is_empty(), "Expected a scope claim");

        self
    }

    fn assert_verifies_with(&self, jwks: &Jwks) -> &Self {
        let kid = header_of(self)
            .kid
            .expect("Token has no kid to look up in the key set");
        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.kid == kid)
            .unwrap_or_else(|| panic!("kid '{}' is not published in the key set", kid));

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.use_, "sig");
        assert_eq!(jwk.alg, "RS256");

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .expect("Published key is not a valid RSA public key");

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        let result = decode::<serde_json::Value>(self, &decoding_key, &validation);
        assert!(
            result.is_ok(),
            "Token failed verification against published key '{}': {:?}",
            kid,
            result.err()
        );

        self
    }

    fn assert_kid_not_published(&self, jwks: &Jwks) -> &Self {
        let kid = header_of(self).kid;
        assert!(
            !jwks.keys.iter().any(|k| Some(&k.kid) == kid.as_ref()),
            "kid {:?} should not be published",
            kid
        );

        self
    }
}
