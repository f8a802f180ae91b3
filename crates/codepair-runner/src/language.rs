//! Supported source languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// A language the runner knows how to build or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Compiled to a `js/wasm` module.
    Go,
    /// Executed with Node.js; stdout is the result.
    JavaScript,
}

impl Language {
    /// Content type of a successful result.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Go => "application/wasm",
            Self::JavaScript => "text/plain; charset=utf-8",
        }
    }

    /// File name the source is written to.
    pub fn source_file(&self) -> &'static str {
        match self {
            Self::Go => "main.go",
            Self::JavaScript => "main.js",
        }
    }
}

impl FromStr for Language {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Self::Go),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            other => Err(ExecutionError::UnsupportedLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Go => write!(f, "go"),
            Self::JavaScript => write!(f, "javascript"),
        }
    }
}
