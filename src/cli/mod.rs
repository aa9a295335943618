//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, task listing and dispatching
//! the selected task to the executor.

pub mod app;

// Re-export main types
pub use app::*;
