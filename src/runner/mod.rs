//! Task execution engine
//!
//! This module handles the execution of tasks, including dependency
//! resolution, image builds, environment lifecycles and health gating.

pub mod command;
pub mod context;
pub mod environment;
pub mod executor;
pub mod health;
pub mod image;
pub mod task;

// Re-export main types
pub use command::*;
pub use context::*;
pub use environment::*;
pub use executor::*;
pub use health::*;
pub use image::*;
pub use task::*;
