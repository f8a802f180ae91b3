//! Page and static asset configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the editor page and its assets are served from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    /// Directory mounted under `/static`.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Page returned for `/` and `/interview/{id}`, relative to `directory`.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            index_file: default_index_file(),
        }
    }
}

impl StaticFilesConfig {
    /// Full path of the index page.
    pub fn index_path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.index_file)
    }
}

fn default_directory() -> String {
    "static".to_string()
}

fn default_index_file() -> String {
    "index.html".to_string()
}
