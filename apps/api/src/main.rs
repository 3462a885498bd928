//! # Storefront API Server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing-subscriber (RUST_LOG, default info + storefront debug)      │
//! │  2. ApiConfig::load()        .env → environment → defaults              │
//! │  3. Database::new()          pool + embedded migrations                 │
//! │  4. axum::serve()            until Ctrl-C / SIGTERM                     │
//! │  5. Database::close()                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront_api::{build_router, ApiConfig, AppState};
use storefront_db::Database;

/// Used when `RUST_LOG` is unset. `storefront` covers every workspace crate.
const DEFAULT_LOG_FILTER: &str = "info,storefront=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Storefront API server...");

    let config = ApiConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        database = %config.database_path,
        policy = ?config.checkout_policy(),
        limits = ?config.checkout_limits(),
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    let (total, applied) = db.migration_status().await?;
    info!(total, applied, "Database ready");

    let state = AppState::new(db.clone(), config.checkout_policy())
        .with_checkout_limits(config.checkout_limits());
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
