//! # codepair-core
//!
//! Core crate for CodePair. Contains the configuration schema, typed
//! session identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CodePair crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
