//! Relink server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use relink_core::config::AppConfig;
use relink_git::{CliGit, GitBackend, GitClient};
use relink_server::{create_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Relink - a git-backed media re-hosting server
#[derive(Parser, Debug)]
#[command(name = "relinkd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "RELINK_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Relink v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // RELINK_CONFIG is just the file path, not configuration itself
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("RELINK_") && key != "RELINK_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: relinkd --config /path/to/config.toml\n  \
             2. Environment variables: RELINK_REPO__REMOTE__OWNER=you \
             RELINK_REPO__REMOTE__REPO=assets RELINK_REPO__REMOTE__TOKEN=... relinkd\n\n\
             See config/server.example.toml for example configuration."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("RELINK_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    // Initialize metadata store
    let metadata = relink_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata store health check failed")?;
    tracing::info!("Metadata store initialized");

    // Initialize the upload backend and its scheduler
    let git: Arc<dyn GitClient> = Arc::new(CliGit::new(&config.repo.base_dir));
    let backend = Arc::new(
        GitBackend::new(
            config.repo.clone(),
            config.fetch.clone(),
            metadata.clone(),
            git,
        )
        .context("failed to wire upload backend")?,
    );
    backend
        .start()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to start upload backend")?;
    tracing::info!("Upload backend started");

    let state = AppState::new(config.clone(), backend.clone(), metadata);
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let an in-flight publish finish before exiting.
    backend.stop().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
