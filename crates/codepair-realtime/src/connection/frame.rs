//! Transport-neutral frames exchanged between the pumps and a transport.

use std::sync::Arc;

/// An opaque text payload. Cloning is a reference-count bump, so fan-out to
/// many members never copies the message body.
pub type Payload = Arc<str>;

/// One frame on a duplex message transport.
///
/// Transports adapt their native message type to this enum; anything the
/// relay has no use for (binary frames that are not UTF-8, for example) is
/// filtered out by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Application payload.
    Text(Payload),
    /// Keepalive probe.
    Ping,
    /// Keepalive answer.
    Pong,
    /// Orderly close.
    Close,
}

impl Frame {
    /// Build a text frame from anything string-like.
    pub fn text(body: impl Into<Payload>) -> Self {
        Self::Text(body.into())
    }
}
