//! Test server harness for E2E testing
//!
//! Provides TestJwksServer for spawning real JWKS server instances in tests.

use chrono::Utc;
use jwks_service::config::Config;
use jwks_service::models::{Jwks, TokenResponse};
use jwks_service::observability::init_metrics_recorder;
use jwks_service::repositories::KeyStore;
use jwks_service::routes::{self, AppState};
use jwks_service::services::key_management_service;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Test harness for spawning the JWKS server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_token_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestJwksServer::spawn().await?;
///
///     let response = reqwest::Client::new()
///         .post(format!("{}/auth", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestJwksServer {
    addr: SocketAddr,
    key_store: Arc<KeyStore>,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Handle to the process-wide Prometheus recorder.
///
/// The first call installs the service recorder globally; every test server in
/// the process then renders that same registry from `/metrics`. If some other
/// recorder already owns the process, a detached recorder is used instead and
/// `/metrics` renders empty.
pub fn shared_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("Metrics recorder unavailable, using detached recorder: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

impl TestJwksServer {
    /// Spawn a server provisioned the same way the binary provisions itself:
    /// one active key and one expired key, `key_lifetime_seconds` either side
    /// of now.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let config = test_config();
        let key_store = Arc::new(KeyStore::new());

        // Key generation metrics are only kept once the recorder is installed
        shared_metrics_handle();

        key_management_service::initialize_signing_keys(
            &key_store,
            &config,
            Utc::now().timestamp(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize signing keys: {}", e))?;

        Self::spawn_with_store(key_store, config).await
    }

    /// Spawn a server over a caller-prepared store.
    ///
    /// Use this for states the startup path never produces, such as an empty
    /// store or one without an expired key.
    pub async fn spawn_with_store(
        key_store: Arc<KeyStore>,
        config: Config,
    ) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState::new(&config, Arc::clone(&key_store)));
        let metrics_handle = shared_metrics_handle();

        // Build routes using the service's real route builder
        let app = routes::build_routes(state, metrics_handle);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            key_store,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get reference to the store backing the server
    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.key_store
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the HTTP client used by the convenience helpers
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// `POST /auth`, or `POST /auth?expired=true` when `expired` is set,
    /// expecting a 200 response.
    pub async fn issue_token(&self, expired: bool) -> Result<String, anyhow::Error> {
        let url = if expired {
            format!("{}/auth?expired=true", self.url())
        } else {
            format!("{}/auth", self.url())
        };

        let response = self.client.post(url).send().await?.error_for_status()?;
        let body: TokenResponse = response.json().await?;
        Ok(body.token)
    }

    /// `GET /jwks`, expecting a 200 response.
    pub async fn fetch_jwks(&self) -> Result<Jwks, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/jwks", self.url()))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl Drop for TestJwksServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released when the test ends.
        self._handle.abort();
    }
}

/// Default configuration with a loopback bind address.
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        ..Config::default()
    }
}
