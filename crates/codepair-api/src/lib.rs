//! # codepair-api
//!
//! HTTP layer for CodePair built on Axum.
//!
//! Serves the editor page, mints session ids, upgrades `/ws/{id}` into a
//! relay connection, and forwards `/compile` to the execution collaborator.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use state::AppState;
