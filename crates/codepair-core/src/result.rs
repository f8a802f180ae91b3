//! Convenience result type alias for CodePair.

use crate::error::AppError;

/// A specialized `Result` type for CodePair operations.
pub type AppResult<T> = Result<T, AppError>;
