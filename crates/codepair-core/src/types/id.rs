//! Identifiers for sessions and connections.
//!
//! Session ids are opaque strings chosen by whoever creates the session;
//! connection ids are server-assigned UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Server-assigned identifier of one relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Opaque identifier of a collaborative session.
///
/// Any non-empty string without `/` is a valid id; freshly generated ids are
/// 8 lowercase hex characters taken from 4 random bytes. Generation does not
/// check for collisions with live sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh 8-character hex id.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4();
        let hex: String = uuid.as_bytes()[..4]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        Self(hex)
    }

    /// Validate an id taken from a request path.
    ///
    /// The id is kept byte for byte; two paths that differ only in
    /// whitespace name two sessions.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::validation("Session id is missing"));
        }
        if raw.len() > max_len {
            return Err(AppError::validation(format!(
                "Session id exceeds {max_len} characters"
            )));
        }
        if raw.contains('/') || raw.chars().any(char::is_control) {
            return Err(AppError::validation("Session id contains invalid characters"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
