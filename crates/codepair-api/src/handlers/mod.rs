//! Route handlers.

pub mod compile;
pub mod health;
pub mod session;
pub mod ws;
