//! API server for the tasks service
//!
//! Serves CRUD endpoints for task documents over HTTP, backed by MongoDB.
//! Configuration comes from `TASKS_*` environment variables.

mod config;
mod deadline;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tasks_core::task::{MemoryTaskStore, MongoTaskStore, TaskRepository};

use crate::config::{Config, StoreBackend};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasks_api=debug,tasks_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let task_store: Arc<dyn TaskRepository> = match config.store {
        StoreBackend::MongoDb => Arc::new(
            MongoTaskStore::connect(&config.mongo)
                .await
                .context("Failed to connect to MongoDB")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory task store, tasks are lost on exit");
            Arc::new(MemoryTaskStore::new())
        }
    };

    let listen_addr = config.listen_addr;
    let app = routes::app(AppState::new(Arc::clone(&task_store), config));

    // The store is released whether or not the server came up cleanly.
    let served = serve(listen_addr, app).await;
    task_store
        .shutdown()
        .await
        .context("Failed to shut down task store")?;
    served
}

async fn serve(listen_addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;

    tracing::info!("REST API listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
