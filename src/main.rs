//! Live Classes API server.

use std::error::Error;
use std::sync::Arc;

use live_classes::adapters::auth::JwtTokenValidator;
use live_classes::adapters::http::{app_router, SessionHandlers};
use live_classes::adapters::postgres::{
    PostgresSessionReader, PostgresSessionRepository, MIGRATOR,
};
use live_classes::config::AppConfig;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting Live Classes API"
    );

    info!(database = %config.database.redacted_url(), "Connecting to database...");
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            e
        })?;

    if config.database.run_migrations {
        info!("Running migrations...");
        MIGRATOR.run(&pool).await?;
    }

    let handlers = SessionHandlers::new(
        Arc::new(PostgresSessionRepository::new(pool.clone())),
        Arc::new(PostgresSessionReader::new(pool.clone())),
        &config.sessions,
    );
    let validator = Arc::new(JwtTokenValidator::new(&config.auth));
    let app = app_router(handlers, validator, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level`; JSON lines in production.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
