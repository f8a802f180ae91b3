//! # codepair-realtime
//!
//! Session broadcast relay for CodePair. Provides:
//!
//! - a [`SessionRegistry`] mapping session ids to hubs, creating each hub
//!   exactly once and evicting hubs that stay empty
//! - per-session [`hub`] actors that own the membership set and fan every
//!   message out to all members, the sender included
//! - the inbound/outbound [`connection`] pumps bridging a duplex transport
//!   to its hub
//!
//! The relay never looks inside a payload.

pub mod connection;
pub mod error;
pub mod hub;
pub mod metrics;
pub mod registry;
pub mod server;

pub use connection::frame::{Frame, Payload};
pub use connection::handle::{ConnectionHandle, ConnectionState};
pub use error::RelayError;
pub use hub::HubHandle;
pub use metrics::RelayMetrics;
pub use registry::SessionRegistry;
pub use server::RealtimeEngine;
