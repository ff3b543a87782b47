//! kitoboy-api - Case-management HTTP service
//!
//! Startup: tracing, configuration (CLI/env > config.toml > defaults),
//! database, operator account, signing secret, then serve.

use anyhow::{Context, Result};
use clap::Parser;
use kitoboy_common::api::auth::load_or_initialize_secret;
use kitoboy_common::config::load_optional_toml_config;
use kitoboy_common::db::{ensure_user, init_database};
use tokio::signal;
use tracing::{error, info};

use kitoboy_api::config::{Args, ServiceConfig};
use kitoboy_api::services::ClassifierClient;
use kitoboy_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Kitoboy API (kitoboy-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let file_config = load_optional_toml_config(args.config.as_deref())
        .context("Failed to load config file")?;
    let config = ServiceConfig::resolve(args, file_config);

    info!("Database path: {}", config.database_path.display());
    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    if let Some((username, password)) = &config.ui_user {
        ensure_user(&pool, username, password)
            .await
            .context("Failed to seed operator account")?;
    }

    let auth_secret = match &config.auth_key {
        Some(key) => key.clone(),
        None => {
            let secret = load_or_initialize_secret(&pool)
                .await
                .context("Failed to load auth secret")?;
            info!("✓ Loaded auth signing secret from database");
            secret
        }
    };

    let classifier = match config.classifier_url.as_deref() {
        Some(url) => {
            let client = ClassifierClient::new(url).context("Failed to build classifier client")?;
            info!("Classifier endpoint: {}", client.endpoint());
            Some(client)
        }
        None => {
            info!("No classifier URL configured; uploaded posts will not be classified");
            None
        }
    };

    if config.allowed_origins.is_empty() {
        info!("CORS: any origin allowed");
    } else {
        info!("CORS: {} allowed origin(s)", config.allowed_origins.len());
    }

    let state = AppState::new(pool, auth_secret, classifier, config.allowed_origins.clone());
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("kitoboy-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
