//! The execution seam used by the HTTP layer.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// Body of `POST /compile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source code.
    pub code: String,
    /// Language name; the configured default applies when absent.
    #[serde(default)]
    pub language: Option<String>,
}

/// A successful build or run.
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    /// Artifact bytes (wasm module or program output).
    pub payload: Bytes,
    /// MIME type of `payload`.
    pub content_type: &'static str,
}

/// Something that turns source code into an artifact.
#[async_trait]
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Build or run `request`.
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutput, ExecutionError>;
}
