//! Task execution types
//!
//! This module contains the runtime representation of tasks.

use crate::config;
use crate::error::{ExecutionError, ExecutionResult};
use std::path::PathBuf;

/// Shell used when a task enables shell mode without naming one
pub const DEFAULT_SHELL: &str = "sh";

/// Runtime task representation
///
/// This differs from config::Task by folding the flat configuration keys
/// into optional run and environment blocks.
#[derive(Debug, Clone)]
pub struct Task {
    /// Task name
    pub name: String,

    /// Tasks to complete first, in order
    pub prerequisites: Vec<String>,

    /// Command to dispatch, if any
    pub run: Option<RunInstruction>,

    /// Multi-container environment wrapping the run
    pub environment: Option<Environment>,
}

impl Task {
    /// Create a new task from configuration
    pub fn from_config(name: String, config: config::Task) -> Self {
        let shell = config.shell.then(|| {
            config
                .shell_executable
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SHELL.to_string())
        });

        let run = config
            .run
            .filter(|r| !r.container.trim().is_empty())
            .map(|r| RunInstruction {
                container: r.container,
                command: r.command,
                shell,
            });

        let environment = config.docker_compose.then(|| Environment {
            compose_file: config
                .docker_compose_file
                .filter(|f| !f.trim().is_empty())
                .map(PathBuf::from),
            teardown: config.docker_compose_down,
        });

        Task {
            name,
            prerequisites: config.prerequisites,
            run,
            environment,
        }
    }

    /// A task with nothing to run and nothing to depend on
    pub fn is_empty(&self) -> bool {
        self.run.is_none() && self.prerequisites.is_empty()
    }
}

/// A command to run in a named container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInstruction {
    pub container: String,
    pub command: String,
    /// Shell program wrapping the command; `None` means word-split
    pub shell: Option<String>,
}

/// A docker compose environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Compose file; the engine's default lookup applies when absent
    pub compose_file: Option<PathBuf>,
    /// Bring the environment down when the task exits
    pub teardown: bool,
}

impl RunInstruction {
    /// Full argument vector for executing in an already-running container
    pub fn exec_argv(&self, task: &str) -> ExecutionResult<Vec<String>> {
        match &self.shell {
            Some(shell) => Ok(vec![
                shell.clone(),
                "-c".to_string(),
                self.command.clone(),
            ]),
            None => split_command(task, &self.command),
        }
    }
}

/// Split a command line into words, honouring quotes
pub fn split_command(task: &str, command: &str) -> ExecutionResult<Vec<String>> {
    shell_words::split(command).map_err(|e| ExecutionError::InvalidCommand {
        task: task.to_string(),
        error: e.to_string(),
    })
}
