//! CodePair Server: collaborative code editing relay
//!
//! Main entry point that loads configuration, sets up logging and starts the
//! HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use codepair_core::config::{AppConfig, LogFormat};
use codepair_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CODEPAIR_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CodePair v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind = %config.server.bind_address(),
        static_dir = %config.static_files.directory,
        execution_enabled = config.execution.enabled,
        idle_session_timeout_secs = config.realtime.idle_session_timeout_seconds,
        "Configuration loaded"
    );

    codepair_api::run_server(config).await
}
