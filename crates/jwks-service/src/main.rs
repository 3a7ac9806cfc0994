use chrono::Utc;
use jwks_service::config::Config;
use jwks_service::observability::init_metrics_recorder;
use jwks_service::repositories::KeyStore;
use jwks_service::routes::{self, AppState};
use jwks_service::services::key_management_service;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwks_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JWKS Server");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        key_lifetime_seconds = config.key_lifetime_seconds,
        token_lifetime_seconds = config.token_lifetime_seconds,
        rsa_key_bits = config.rsa_key_bits,
        "Configuration loaded successfully"
    );

    // Initialize Prometheus metrics recorder before anything records
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    // Provision one active and one expired signing key
    info!("Initializing signing keys...");
    let key_store = Arc::new(KeyStore::new());
    let initial_keys = key_management_service::initialize_signing_keys(
        &key_store,
        &config,
        Utc::now().timestamp(),
    )
    .await
    .map_err(|e| {
        error!("Failed to initialize signing keys: {}", e);
        e
    })?;

    info!(
        active_kid = %initial_keys.active.kid(),
        expired_kid = %initial_keys.expired.kid(),
        "Signing keys initialized"
    );

    // Parse bind address
    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    // Create application state
    let state = Arc::new(AppState::new(&config, key_store));

    // Build application routes
    let app = routes::build_routes(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    info!("JWKS Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("JWKS Server shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
