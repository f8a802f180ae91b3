//! Compile/run collaborator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the `/compile` execution collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Whether `/compile` accepts requests at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Wall-clock limit for one build or run, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum number of concurrent builds/runs.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Maximum accepted source size in bytes.
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,
    /// Go toolchain executable.
    #[serde(default = "default_go_binary")]
    pub go_binary: String,
    /// Node.js executable.
    #[serde(default = "default_node_binary")]
    pub node_binary: String,
    /// Language assumed when a request omits `language`.
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_seconds: default_timeout(),
            max_concurrent: default_max_concurrent(),
            max_source_bytes: default_max_source_bytes(),
            go_binary: default_go_binary(),
            node_binary: default_node_binary(),
            default_language: default_language(),
        }
    }
}

impl ExecutionConfig {
    /// Wall-clock limit as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    4
}

fn default_max_source_bytes() -> usize {
    256 * 1024
}

fn default_go_binary() -> String {
    "go".to_string()
}

fn default_node_binary() -> String {
    "node".to_string()
}

fn default_language() -> String {
    "go".to_string()
}
