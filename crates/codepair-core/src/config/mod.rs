//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so that a missing file still
//! yields a runnable server.

pub mod app;
pub mod execution;
pub mod logging;
pub mod realtime;
pub mod static_files;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::execution::ExecutionConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::realtime::RealtimeConfig;
pub use self::static_files::StaticFilesConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session relay settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Compile/run collaborator settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Page and asset serving.
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CODEPAIR_`.
    pub fn load(env: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CODEPAIR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("defaults should deserialize");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.realtime.outbound_queue_size, 256);
        assert_eq!(config.execution.default_language, "go");
        assert_eq!(config.static_files.directory, "static");
    }

    #[test]
    fn test_toml_overrides_section() {
        let toml = r#"
            [realtime]
            outbound_queue_size = 8
            idle_session_timeout_seconds = 0

            [logging]
            format = "pretty"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("overrides should deserialize");

        assert_eq!(config.realtime.outbound_queue_size, 8);
        assert_eq!(config.realtime.idle_session_timeout(), None);
        assert_eq!(config.realtime.hub_queue_size, 1024);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "info");
    }
}
