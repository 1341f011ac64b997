//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, schema migration, service wiring, and the Axum
//! server lifecycle.

use crate::application::services::{LinkService, MigrationRunner};
use crate::config::{Config, StorageBackend};
use crate::domain::entities::MigrationReport;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::migrations::MIGRATIONS;
use crate::infrastructure::persistence::{
    MemoryLinkRepository, PgLinkRepository, PgMigrationRepository, pool,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (or the in-memory store)
/// - Schema migrations, before any request is accepted
/// - Link service with the configured code generator
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Any migration fails or the history is inconsistent
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let generator = config.code_generator()?;

    let link_repository: Arc<dyn LinkRepository> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = Arc::new(connect(&config).await?);
            run_migrations(pool.clone()).await?;
            Arc::new(PgLinkRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; links are lost on shutdown");
            Arc::new(MemoryLinkRepository::new())
        }
    };

    let link_service = Arc::new(LinkService::new(
        link_repository,
        generator,
        config.base_url.clone(),
    ));
    let state = AppState::new(link_service);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Opens the PostgreSQL pool described by `config`.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the database is unreachable.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for the postgres backend")?;

    pool::connect(database_url, &config.pool_settings())
        .await
        .context("Failed to connect to database")
}

/// Brings the schema up to date with the migration registry.
///
/// # Errors
///
/// Any [`crate::error::MigrationError`] is returned; the caller must not
/// start serving afterwards.
pub async fn run_migrations(pool: Arc<PgPool>) -> Result<MigrationReport> {
    let repository = Arc::new(PgMigrationRepository::new(pool));
    let runner = MigrationRunner::new(repository, MIGRATIONS)?;

    let report = runner.run().await.context("Schema migration failed")?;
    if !report.is_noop() {
        tracing::info!(applied = ?report.applied, "Schema migrated");
    }

    Ok(report)
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections");
}
