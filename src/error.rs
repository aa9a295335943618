//! Error types for ctask

use crate::engine::EngineError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for ctask operations
pub type Result<T> = std::result::Result<T, CtaskError>;

/// Main error type for ctask
#[derive(Error, Debug)]
pub enum CtaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A task failed while executing
    #[error("Error running task '{task}': {source}")]
    Task {
        task: String,
        #[source]
        source: ExecutionError,
    },

    /// Invalid command-line usage
    #[error("{0}")]
    Usage(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration discovery and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),
}

/// Why a health gate did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthFailure {
    /// The engine reported the container as unhealthy
    Unhealthy,
    /// No conclusive status was observed before the deadline
    TimedOut(Duration),
    /// The status query itself failed
    StatusQuery(String),
}

impl std::fmt::Display for HealthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthFailure::Unhealthy => write!(f, "container is unhealthy"),
            HealthFailure::TimedOut(after) if after.as_secs() == 0 => write!(
                f,
                "timed out after {}ms waiting for healthy status",
                after.as_millis()
            ),
            HealthFailure::TimedOut(after) => {
                write!(f, "timed out after {}s waiting for healthy status", after.as_secs())
            }
            HealthFailure::StatusQuery(error) => write!(f, "status query failed: {}", error),
        }
    }
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Container '{container}' not found for task '{task}'")]
    ContainerNotFound { task: String, container: String },

    #[error("Container '{0}' declares neither an image nor a build context")]
    MissingImage(String),

    #[error("Task '{0}' has no prerequisites or run command defined")]
    EmptyTask(String),

    #[error("Image build failed for container '{container}': {legacy}")]
    BuildFailed {
        container: String,
        /// Failure of the modern strategy, when it was attempted
        modern: Option<EngineError>,
        legacy: EngineError,
    },

    #[error("Failed to start environment: {0}")]
    EnvironmentStartFailed(#[source] EngineError),

    #[error("Container '{container}' failed health check: {reason}")]
    HealthCheckFailed {
        container: String,
        reason: HealthFailure,
        /// Recent log lines captured from the container
        logs: String,
    },

    #[error("Command for task '{task}' failed: {source}")]
    RunFailed {
        task: String,
        #[source]
        source: EngineError,
    },

    #[error("Invalid command for task '{task}': {error}")]
    InvalidCommand { task: String, error: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Failed prerequisite '{task}': {source}")]
    Prerequisite {
        task: String,
        #[source]
        source: Box<ExecutionError>,
    },
}

impl ExecutionError {
    /// Innermost error, skipping prerequisite wrappers
    pub fn root_cause(&self) -> &ExecutionError {
        let mut current = self;
        while let ExecutionError::Prerequisite { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Chain of prerequisite names leading to the root cause, outermost first
    pub fn task_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let ExecutionError::Prerequisite { task, source } = current {
            chain.push(task.as_str());
            current = source.as_ref();
        }
        chain
    }

    /// Container name and captured log tail when the root cause is a failed health gate
    pub fn health_logs(&self) -> Option<(&str, &str)> {
        match self.root_cause() {
            ExecutionError::HealthCheckFailed {
                container, logs, ..
            } if !logs.is_empty() => Some((container.as_str(), logs.as_str())),
            _ => None,
        }
    }
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
