//! Integration tests for key publication (`/jwks` and `/.well-known/jwks.json`)

use chrono::Utc;
use jwks_service::models::Jwks;
use jwks_test_utils::{store_with_expiries, test_config, TestJwksServer, TokenAssertions};
use reqwest::StatusCode;

// ============================================================================
// Publication
// ============================================================================

/// A freshly started server publishes exactly its one active key.
#[tokio::test]
async fn test_jwks_publishes_only_active_key() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;
    let now = Utc::now().timestamp();
    let active_kid = server.key_store().get_active_key(now)?.kid().to_string();
    let expired_kid = server.key_store().get_expired_key(now)?.kid().to_string();

    // Act
    let jwks = server.fetch_jwks().await?;

    // Assert
    assert_eq!(jwks.keys.len(), 1);
    let jwk = &jwks.keys[0];
    assert_eq!(jwk.kid, active_kid);
    assert_ne!(jwk.kid, expired_kid);
    assert_eq!(jwk.kty, "RSA");
    assert_eq!(jwk.use_, "sig");
    assert_eq!(jwk.alg, "RS256");
    assert_eq!(jwk.e, "AQAB");
    assert!(!jwk.n.contains('='), "Modulus must be unpadded base64url");

    Ok(())
}

/// The JSON wire format names the usage member `use`.
#[tokio::test]
async fn test_jwks_wire_member_names() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let body: serde_json::Value = reqwest::get(format!("{}/jwks", server.url()))
        .await?
        .json()
        .await?;

    // Assert
    let key = &body["keys"][0];
    for member in ["kty", "kid", "use", "alg", "n", "e"] {
        assert!(key.get(member).is_some(), "JWK is missing '{}'", member);
    }
    assert!(key.get("use_").is_none());

    Ok(())
}

#[tokio::test]
async fn test_well_known_alias_matches_jwks() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let primary = server.fetch_jwks().await?;
    let alias: Jwks = reqwest::get(format!("{}/.well-known/jwks.json", server.url()))
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Assert
    assert_eq!(primary.keys, alias.keys);

    Ok(())
}

#[tokio::test]
async fn test_jwks_response_is_not_cached() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let response = reqwest::get(format!("{}/jwks", server.url())).await?;

    // Assert
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    Ok(())
}

// ============================================================================
// kid filtering
// ============================================================================

#[tokio::test]
async fn test_jwks_filter_by_active_kid() -> Result<(), anyhow::Error> {
    // Arrange
    let now = Utc::now().timestamp();
    let (store, records) = store_with_expiries(&[now + 600, now + 1200])?;
    let server = TestJwksServer::spawn_with_store(store, test_config()).await?;

    // Act
    let jwks: Jwks = reqwest::get(format!("{}/jwks?kid={}", server.url(), records[0].kid()))
        .await?
        .json()
        .await?;

    // Assert
    assert_eq!(jwks.keys.len(), 1);
    assert_eq!(jwks.keys[0].kid, records[0].kid());

    Ok(())
}

/// Unknown kids are not an error; the key set is simply empty.
#[tokio::test]
async fn test_jwks_unknown_kid_returns_empty_set() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let response = reqwest::get(format!("{}/jwks?kid=nonexistent", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, serde_json::json!({ "keys": [] }));

    Ok(())
}

/// Filtering by an expired kid never reveals it.
#[tokio::test]
async fn test_jwks_expired_kid_filter_returns_empty_set() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;
    let expired_token = server.issue_token(true).await?;
    let kid = jsonwebtoken::decode_header(&expired_token)?
        .kid
        .ok_or_else(|| anyhow::anyhow!("expired token has no kid"))?;

    // Act
    let jwks: Jwks = reqwest::get(format!("{}/jwks?kid={}", server.url(), kid))
        .await?
        .json()
        .await?;

    // Assert
    assert!(jwks.keys.is_empty());
    expired_token.assert_kid_not_published(&jwks);

    Ok(())
}

#[tokio::test]
async fn test_jwks_empty_store_returns_empty_set() -> Result<(), anyhow::Error> {
    // Arrange
    let (store, _) = store_with_expiries(&[])?;
    let server = TestJwksServer::spawn_with_store(store, test_config()).await?;

    // Act
    let jwks = server.fetch_jwks().await?;

    // Assert
    assert!(jwks.keys.is_empty());

    Ok(())
}
