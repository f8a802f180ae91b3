//! Unified error type for compile/run requests.

use codepair_core::error::AppError;
use thiserror::Error;

/// Everything that can go wrong while building or running submitted code.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The toolchain rejected the source. Carries its diagnostics verbatim.
    #[error("{diagnostics}")]
    CompileError {
        /// Combined compiler/runtime output.
        diagnostics: String,
    },

    /// No runner exists for the requested language.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Source exceeds the configured limit.
    #[error("Source is {size} bytes, exceeding limit of {limit}")]
    SourceTooLarge {
        /// Submitted size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The build or run did not finish in time and was killed.
    #[error("Execution timed out after {timeout_seconds}s")]
    Timeout {
        /// The limit that was exceeded.
        timeout_seconds: u64,
    },

    /// Execution is switched off in configuration.
    #[error("Code execution is disabled")]
    Disabled,

    /// The toolchain could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Executable that failed to start.
        program: String,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The concurrency limiter was closed.
    #[error("Execution slots are unavailable")]
    SlotsClosed,

    /// Working-directory or artifact I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExecutionError> for AppError {
    fn from(err: ExecutionError) -> Self {
        match &err {
            ExecutionError::CompileError { .. }
            | ExecutionError::UnsupportedLanguage(_)
            | ExecutionError::SourceTooLarge { .. } => AppError::validation(err.to_string()),
            ExecutionError::Timeout { .. }
            | ExecutionError::Disabled
            | ExecutionError::SlotsClosed => AppError::service_unavailable(err.to_string()),
            ExecutionError::Spawn { .. } | ExecutionError::Io(_) => {
                AppError::internal(err.to_string())
            }
        }
    }
}
