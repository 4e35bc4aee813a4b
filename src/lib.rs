pub mod api; // HTTP upload + audit endpoints
pub mod config;
pub mod core_state; // Shared state: db path, import config, audit buffer
pub mod db;
pub mod models;
pub mod pipeline; // Spreadsheet decoding + batched persistence
mod phi_audit;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::core_state::{CoreError, CoreState};

/// Errors that stop the service before it starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database setup failed: {0}")]
    Core(#[from] CoreError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the service until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    tracing::info!("MDT import starting v{}", config::APP_VERSION);

    let core = Arc::new(CoreState::from_config(&config));

    // Migrate up front so a broken database fails startup, not the first upload.
    let setup = Arc::clone(&core);
    tokio::task::spawn_blocking(move || setup.open_db().map(|_| ()))
        .await
        .map_err(|e| CoreError::TaskJoin(e.to_string()))??;
    tracing::info!(db_path = %config.db_path.display(), "Database ready");

    let mut server = api::start_api_server(core, config.bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening for workbook uploads");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown();
    server.wait().await;
    Ok(())
}
