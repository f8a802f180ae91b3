//! # codepair-runner
//!
//! The compile/run collaborator behind `POST /compile`. It is deliberately
//! separate from the relay: the relay never calls into it.

pub mod error;
pub mod executor;
pub mod language;
pub mod process;

pub use error::ExecutionError;
pub use executor::{ExecutionOutput, ExecutionRequest, Executor};
pub use language::Language;
pub use process::ProcessExecutor;
