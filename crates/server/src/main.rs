use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docvault_core::{
    create_authenticator, load_config, validate_config, HttpRepositoryGateway, LoggingConfig,
    MetadataIndex, RepositoryGateway, RepositoryTicketProvider, SqliteMetadataIndex,
    TicketProvider,
};
use docvault_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber is not installed when configuration fails to load.
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", config.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(config.json.then(|| fmt::layer().json()))
        .with((!config.json).then(fmt::layer))
        .init();
}

async fn run() -> Result<()> {
    let config_path = std::env::var("DOCVAULT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);
    info!("Configuration loaded from {:?}", config_path);
    info!("Auth method: {:?}", config.auth.method);
    info!("Repository: {}", config.repository.url);
    info!("Index path: {:?}", config.index.path);

    let authenticator =
        create_authenticator(&config.auth).context("Failed to create authenticator")?;

    let ticket_provider: Arc<dyn TicketProvider> = Arc::new(
        RepositoryTicketProvider::new(&config.repository)
            .context("Failed to create ticket provider")?,
    );
    let repository: Arc<dyn RepositoryGateway> = Arc::new(
        HttpRepositoryGateway::new(&config.repository)
            .context("Failed to create repository client")?,
    );

    // Opened on first use
    let index = Arc::new(SqliteMetadataIndex::new(&config.index));
    info!("Metadata index collection: {}", config.index.collection);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        authenticator,
        ticket_provider,
        repository,
        index.clone(),
    ));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Err(e) = index.close() {
        warn!(error = %e, "Failed to close metadata index");
    }
    info!("Metadata index closed");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
