mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use snaplink_gateway::{App, AppState};
use snaplink_generator::RandomGenerator;
use snaplink_shortener::{Shortener, ShortenerService, ShortenerSettings};
use snaplink_storage::{InMemoryRepository, MySqlRepository};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let config = CLI::parse();
    let _telemetry = snaplink_telemetry::init(&config.telemetry())?;

    info!(
        listen_addr = %config.socket_addr(),
        storage_backend = %config.storage,
        max_allocation_attempts = config.max_allocation_attempts,
        count_resolutions = config.count_resolutions,
        "starting gateway server"
    );

    let settings = ShortenerSettings::builder()
        .max_attempts(config.max_allocation_attempts)
        .count_resolutions(config.count_resolutions)
        .build();

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(ShortenerService::new(
            InMemoryRepository::new(),
            RandomGenerator::new(),
            settings,
        )),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn, config.mysql_max_connections)
                .await
                .context("failed to connect to mysql")?;
            repository
                .ensure_schema()
                .await
                .context("failed to create url_mappings table")?;
            Arc::new(ShortenerService::new(
                repository,
                RandomGenerator::new(),
                settings,
            ))
        }
    };

    let router = App::router(AppState::new(shortener));

    let listener = TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown signal received, draining connections");
}
