//! Integration tests for token issuance (`POST /auth`)

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jwks_service::config::{DEFAULT_AUDIENCE, DEFAULT_ISSUER, DEFAULT_SCOPE, DEFAULT_SUBJECT};
use jwks_test_utils::{store_with_expiries, test_config, TestJwksServer, TokenAssertions};
use reqwest::StatusCode;

// ============================================================================
// Active flow
// ============================================================================

/// A token from `POST /auth` verifies against the key published in `/jwks`.
#[tokio::test]
async fn test_issued_token_verifies_against_jwks() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;
    let active_kid = server
        .key_store()
        .get_active_key(Utc::now().timestamp())?
        .kid()
        .to_string();

    // Act
    let token = server.issue_token(false).await?;
    let jwks = server.fetch_jwks().await?;

    // Assert
    token
        .assert_valid_jwt()
        .assert_signed_by(&active_kid)
        .assert_for_subject(DEFAULT_SUBJECT)
        .assert_issued_for(DEFAULT_ISSUER, DEFAULT_AUDIENCE)
        .assert_expires_in(server.config().token_lifetime_seconds as u64)
        .assert_verifies_with(&jwks);

    Ok(())
}

#[tokio::test]
async fn test_issued_token_carries_scope() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let token = server.issue_token(false).await?;

    // Assert
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("token has no payload"))?;
    let claims: serde_json::Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload)?)?;
    assert_eq!(claims["scope"], DEFAULT_SCOPE);

    Ok(())
}

/// The token endpoint ignores any request body.
#[tokio::test]
async fn test_request_body_is_ignored() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth", server.url()))
        .body("username=alice&password=ignored")
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_get_auth_not_allowed() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let response = reqwest::get(format!("{}/auth", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

// ============================================================================
// Expired flow
// ============================================================================

/// `?expired=true` yields a token already past its `exp`, signed by a key that
/// is not published.
#[tokio::test]
async fn test_expired_token_is_expired_and_unpublished() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;
    let expired_record = server.key_store().get_expired_key(Utc::now().timestamp())?;

    // Act
    let token = server.issue_token(true).await?;
    let jwks = server.fetch_jwks().await?;

    // Assert
    token
        .assert_valid_jwt()
        .assert_signed_by(expired_record.kid())
        .assert_expired()
        .assert_kid_not_published(&jwks);

    Ok(())
}

/// The bare `?expired` flag selects the expired flow just like `?expired=true`.
#[tokio::test]
async fn test_expired_flag_without_value() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;
    let expired_kid = server
        .key_store()
        .get_expired_key(Utc::now().timestamp())?
        .kid()
        .to_string();

    // Act
    let response = server
        .client()
        .post(format!("{}/auth?expired", server.url()))
        .send()
        .await?
        .error_for_status()?;
    let body: serde_json::Value = response.json().await?;

    // Assert
    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("response has no token"))?
        .to_string();
    token.assert_signed_by(&expired_kid).assert_expired();

    Ok(())
}

// ============================================================================
// Missing keys
// ============================================================================

#[tokio::test]
async fn test_no_active_key_returns_503() -> Result<(), anyhow::Error> {
    // Arrange
    let now = Utc::now().timestamp();
    let (store, _) = store_with_expiries(&[now - 600])?;
    let server = TestJwksServer::spawn_with_store(store, test_config()).await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "NO_ACTIVE_KEY");

    Ok(())
}

#[tokio::test]
async fn test_no_expired_key_returns_404() -> Result<(), anyhow::Error> {
    // Arrange
    let now = Utc::now().timestamp();
    let (store, _) = store_with_expiries(&[now + 600])?;
    let server = TestJwksServer::spawn_with_store(store, test_config()).await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth?expired=true", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "NO_EXPIRED_KEY");

    Ok(())
}

/// With several active keys, tokens come from the one expiring last.
#[tokio::test]
async fn test_latest_expiring_key_signs() -> Result<(), anyhow::Error> {
    // Arrange
    let now = Utc::now().timestamp();
    let (store, records) = store_with_expiries(&[now + 600, now + 1800, now + 1200])?;
    let server = TestJwksServer::spawn_with_store(store, test_config()).await?;

    // Act
    let token = server.issue_token(false).await?;
    let jwks = server.fetch_jwks().await?;

    // Assert
    assert_eq!(jwks.keys.len(), 3);
    token
        .assert_signed_by(records[1].kid())
        .assert_verifies_with(&jwks);

    Ok(())
}
