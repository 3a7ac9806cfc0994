//! Integration tests for the Prometheus scrape endpoint
//!
//! Every test server in this process renders the same installed registry, so
//! counters are cumulative across tests. Assertions only check that a series
//! is present, never its value.

use jwks_test_utils::{store_with_expiries, test_config, TestJwksServer};
use reqwest::StatusCode;

/// True when some sample line of `body` is for `name` and carries every label.
fn has_series(body: &str, name: &str, labels: &[&str]) -> bool {
    let labelled = format!("{}{{", name);
    let bare = format!("{} ", name);
    body.lines()
        .filter(|line| line.starts_with(&labelled) || line.starts_with(&bare))
        .any(|line| labels.iter().all(|label| line.contains(label)))
}

async fn scrape(server: &TestJwksServer) -> Result<String, anyhow::Error> {
    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(response.text().await?)
}

#[tokio::test]
async fn test_metrics_expose_successful_traffic() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;
    server.issue_token(false).await?;
    server.issue_token(true).await?;
    server.fetch_jwks().await?;

    // Act
    let body = scrape(&server).await?;

    // Assert
    assert!(
        has_series(
            &body,
            "jwks_token_issuance_total",
            &[r#"flow="active""#, r#"status="success""#]
        ),
        "missing active issuance series in:\n{}",
        body
    );
    assert!(has_series(
        &body,
        "jwks_token_issuance_total",
        &[r#"flow="expired""#, r#"status="success""#]
    ));
    assert!(has_series(
        &body,
        "jwks_requests_total",
        &[r#"filtered="false""#]
    ));
    assert!(has_series(
        &body,
        "jwks_key_generation_total",
        &[r#"status="success""#]
    ));
    assert!(body.contains("jwks_token_issuance_duration_seconds"));

    Ok(())
}

#[tokio::test]
async fn test_metrics_expose_error_codes() -> Result<(), anyhow::Error> {
    // Arrange
    let (store, _) = store_with_expiries(&[])?;
    let server = TestJwksServer::spawn_with_store(store, test_config()).await?;
    let response = server
        .client()
        .post(format!("{}/auth", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Act
    let body = scrape(&server).await?;

    // Assert
    assert!(
        has_series(
            &body,
            "jwks_errors_total",
            &[
                r#"operation="issue_token""#,
                r#"error_code="NO_ACTIVE_KEY""#,
                r#"status_code="503""#,
            ]
        ),
        "missing error series in:\n{}",
        body
    );
    assert!(has_series(
        &body,
        "jwks_token_issuance_total",
        &[r#"flow="active""#, r#"status="error""#]
    ));

    Ok(())
}

#[tokio::test]
async fn test_metrics_content_type() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn().await?;

    // Act
    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    // Assert
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "got {}", content_type);

    Ok(())
}
