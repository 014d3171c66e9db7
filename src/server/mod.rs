pub mod app;
pub mod handlers;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::database::{connection::*, migrations::Migrator};
use crate::services::queue::GenerationWorker;

/// How often the job retention sweep runs, and how long finished rows live.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
const JOB_RETENTION_DAYS: i64 = 7;

pub async fn start_server(
    port: u16,
    database_path: &str,
    generation_root: PathBuf,
    cors_origin: Option<&str>,
    queue_capacity: usize,
) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let (state, queue_receiver) = app::AppState::build(db, generation_root, queue_capacity);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let worker = GenerationWorker::new(state.generation.clone(), queue_receiver, shutdown_rx);
    let worker_handle = tokio::spawn(worker.run());
    let sweep_handle = state
        .jobs
        .spawn_retention_sweep(SWEEP_INTERVAL, chrono::Duration::days(JOB_RETENTION_DAYS));

    let app = app::create_app(state, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // stop the worker loop, then wait for it to drain its current item
    let _ = shutdown_tx.send(true);
    sweep_handle.abort();
    let _ = worker_handle.await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                          - Health check");
    info!("  /api/v1/users                    - User accounts");
    info!("  /api/v1/projects                 - Projects and schema editing");
    info!("  /api/v1/projects/:id/generate    - Queued / durable / synchronous generation");
    info!("  /api/v1/projects/:id/files       - Generated source browsing");
    info!("  /api/v1/events                   - Project update events (SSE)");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
