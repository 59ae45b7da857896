use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use lifeline_api::api::handlers::health::initialize_server_start_time;
use lifeline_api::api::{create_app, AppState};
use lifeline_data::database::{create_pool, DatabaseType};
use lifeline_data::storage::LocalObjectStore;
use lifeline_domain::config::AppConfig;

/// Entry point for the Lifeline API server
///
/// Loads `.env`, installs tracing, opens the database, prepares the upload
/// directory and serves until Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting Lifeline API server");

    let config = AppConfig::from_env().context("invalid configuration")?;

    if config.jwt.secret.is_none() {
        warn!("JWT_SECRET is not set; authenticated routes will answer 500");
    }
    if config.gemini.api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; AI routes will answer 500");
    }

    if config.database.db_type == DatabaseType::Sqlite {
        if let Some(dir) = Path::new(&config.database.sqlite_path).parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create data directory {}", dir.display()))?;
            }
        }
        info!("Using SQLite database at {}", config.database.sqlite_path);
    } else {
        info!("Using in-memory SQLite database; data is lost on shutdown");
    }

    let pool = create_pool(&config.database).context("failed to open database")?;

    let store = LocalObjectStore::open(&config.storage.dir, &config.storage.public_url)
        .with_context(|| format!("failed to open storage directory {}", config.storage.dir))?;
    info!("Serving uploads from {} at {}", config.storage.dir, config.storage.public_url);

    let state = AppState::from_config(&config, pool, store).context("failed to build services")?;

    initialize_server_start_time();
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutting down server...");
}
