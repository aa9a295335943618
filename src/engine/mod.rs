//! Container engine boundary
//!
//! Every interaction with the container engine goes through the [`Engine`]
//! trait. The core only interprets success or failure of each operation,
//! plus the text returned by status and log queries.

pub mod docker;
pub mod scripted;

pub use docker::DockerEngine;
pub use scripted::ScriptedEngine;

use crate::config::HealthCheck;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by an engine invocation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{operation}` exited with status {}", describe_code(.code))]
    Exit {
        operation: String,
        code: Option<i32>,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Image build strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy {
    /// `buildx build --load`
    BuildKit,
    /// Classic `build`
    Legacy,
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStrategy::BuildKit => write!(f, "buildkit"),
            BuildStrategy::Legacy => write!(f, "legacy"),
        }
    }
}

/// A bind mount with an absolute host path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub source: PathBuf,
    pub target: String,
}

/// Everything needed to start a one-off container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub image: String,
    pub mounts: Vec<Mount>,
    pub working_dir: Option<String>,
    pub healthcheck: Option<HealthCheck>,
    /// Overrides the image entrypoint (used for shell mode)
    pub entrypoint: Option<String>,
    pub args: Vec<String>,
}

/// Logical operations issued against the container engine
///
/// Build, run and exec forward their output to the invoking process;
/// status and log queries return captured text.
pub trait Engine {
    /// Build `context` and tag the result as `tag`
    fn build_image(&self, context: &Path, tag: &str, strategy: BuildStrategy) -> EngineResult<()>;

    /// Run a throwaway container and wait for it to exit
    fn run_container(&self, request: &RunRequest) -> EngineResult<()>;

    /// Bring a compose environment up in the background
    fn compose_up(&self, file: Option<&Path>) -> EngineResult<()>;

    /// Bring a compose environment down
    fn compose_down(&self, file: Option<&Path>) -> EngineResult<()>;

    /// Execute `argv` inside a running environment container
    fn compose_exec(&self, file: Option<&Path>, container: &str, argv: &[String])
        -> EngineResult<()>;

    /// Current status of an environment container, as reported by the engine
    fn compose_status(&self, file: Option<&Path>, container: &str) -> EngineResult<String>;

    /// Last `tail` log lines of an environment container
    fn compose_logs(&self, file: Option<&Path>, container: &str, tail: usize)
        -> EngineResult<String>;
}
