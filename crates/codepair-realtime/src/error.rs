//! Relay error type.

use thiserror::Error;

use codepair_core::error::AppError;

/// Reasons a join is refused.
///
/// Transport faults never surface here: the pumps turn them into that
/// connection's own unregister.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The hub stopped (evicted or shut down) before accepting the request.
    #[error("Hub for session {0} is closed")]
    HubClosed(String),

    /// The registry was shut down and no longer creates hubs.
    #[error("Session registry is shut down")]
    RegistryClosed,
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        AppError::service_unavailable(err.to_string())
    }
}
