//! Relay connections: per-participant state and the inbound/outbound pumps.

pub mod frame;
pub mod handle;
pub mod pump;

pub use frame::{Frame, Payload};
pub use handle::{ConnectionHandle, ConnectionInfo, ConnectionState};
pub use pump::{PumpConfig, run_inbound, run_outbound};
