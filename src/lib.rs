//! ctask - a container-based task runner
//!
//! ctask reads named containers and tasks from a YAML file and runs each
//! task's command inside its container, after the task's prerequisites and
//! any docker compose environment it needs are in place.

// Public modules
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use error::{CtaskError, Result};

/// Current version of ctask
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
