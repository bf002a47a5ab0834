use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use notification_rest_service::config::Settings;
use notification_rest_service::postgres::PostgresPool;
use notification_rest_service::server::{create_app, AppState};
use notification_rest_service::store::create_store;
use notification_rest_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing (and OTLP export when enabled)
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!(store = %settings.store.backend, "Configuration loaded");

    // Connect to PostgreSQL unless the memory store was asked for
    let postgres_pool = if settings.store.backend == "memory" {
        None
    } else {
        let pool = PostgresPool::new(&settings.database).await?;
        if settings.database.run_migrations {
            pool.migrate().await?;
        }
        Some(pool)
    };

    // Create application state
    let store = create_store(&settings.store, postgres_pool.as_ref());
    let state = AppState::new(settings.clone(), store);
    tracing::info!(backend = state.store.backend_type(), "Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
