use crate::errors::JwksError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::{pkcs1::EncodeRsaPrivateKey, traits::PublicKeyParts, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// JWS algorithm identifier for every token and key this service produces.
pub const SIGNING_ALGORITHM: &str = "RS256";

/// Default RSA modulus size in bits.
pub const DEFAULT_RSA_KEY_BITS: usize = 2048;

/// JWT claims issued by this service.
///
/// The `sub` field identifies the token holder and is redacted in Debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject
    pub iss: String,   // Issuer
    pub aud: String,   // Audience
    pub iat: i64,      // Issued at timestamp
    pub exp: i64,      // Expiration timestamp
    pub scope: String, // Space-separated scopes
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("scope", &self.scope)
            .finish()
    }
}

/// An RSA key pair ready for signing and publication.
///
/// The private half only exists as the PKCS#1 DER inside `encoding_key`;
/// it is never serialized back out.
#[derive(Clone)]
pub struct SigningKeyPair {
    encoding_key: EncodingKey,
    public_key: RsaPublicKey,
}

impl SigningKeyPair {
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Public modulus as unpadded base64url.
    pub fn modulus_b64(&self) -> String {
        encode_unsigned_be(&self.public_key.n().to_bytes_be())
    }

    /// Public exponent as unpadded base64url.
    pub fn exponent_b64(&self) -> String {
        encode_unsigned_be(&self.public_key.e().to_bytes_be())
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("encoding_key", &"[REDACTED]")
            .field("modulus_bits", &(self.public_key.size() * 8))
            .finish()
    }
}

impl TryFrom<RsaPrivateKey> for SigningKeyPair {
    type Error = JwksError;

    fn try_from(private_key: RsaPrivateKey) -> Result<Self, Self::Error> {
        let der = private_key
            .to_pkcs1_der()
            .map_err(|e| JwksError::Crypto(format!("Private key encoding failed: {}", e)))?;

        Ok(Self {
            encoding_key: EncodingKey::from_rsa_der(der.as_bytes()),
            public_key: private_key.to_public_key(),
        })
    }
}

/// Generate an RSA key pair (public exponent 65537) using the OS CSPRNG.
///
/// CPU-bound and slow; callers on the async runtime should run it via
/// `spawn_blocking`.
#[instrument(skip_all, fields(bits = bits))]
pub fn generate_signing_key(bits: usize) -> Result<SigningKeyPair, JwksError> {
    let private_key = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| JwksError::Crypto(format!("Keypair generation failed: {}", e)))?;

    SigningKeyPair::try_from(private_key)
}

/// Encode an unsigned big-endian integer the way JWK `n`/`e` members expect.
///
/// Leading zero bytes are stripped; zero itself encodes as a single zero byte.
pub fn encode_unsigned_be(bytes: &[u8]) -> String {
    let first_nonzero = bytes.iter().position(|b| *b != 0);
    let minimal: &[u8] = match first_nonzero {
        Some(start) => bytes.get(start..).unwrap_or(&[0]),
        None => &[0],
    };
    URL_SAFE_NO_PAD.encode(minimal)
}

/// Sign JWT with RS256
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, key: &SigningKeyPair, key_id: &str) -> Result<String, JwksError> {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, claims, key.encoding_key())
        .map_err(|e| JwksError::Crypto(format!("JWT signing operation failed: {}", e)))
}
