//! Core configuration types
//!
//! This module defines the data structures that represent a ctask.yml configuration file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Containers that tasks can run in
    #[serde(default)]
    pub containers: HashMap<String, Container>,

    /// Tasks defined in the configuration
    #[serde(default)]
    pub tasks: HashMap<String, Task>,
}

impl Config {
    /// Task names sorted for stable listing
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// How to obtain and run a container
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Container {
    /// Image reference to run directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Build context directory; takes precedence over `image`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    /// Skip the buildx strategy and use the classic builder
    #[serde(default)]
    pub legacy_build: bool,

    /// Bind mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

    /// Working directory inside the container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Health check passed to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthCheck>,
}

impl Container {
    /// Build context, ignoring blank values
    pub fn build_context(&self) -> Option<&str> {
        self.build.as_deref().filter(|b| !b.trim().is_empty())
    }

    /// Declared image reference, ignoring blank values
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.trim().is_empty())
    }
}

/// A bind mount from the host into the container
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Volume {
    /// Host path, relative paths resolve against the working directory
    pub local: String,

    /// Mount point inside the container
    pub container: String,
}

/// Health check descriptor, forwarded to the engine as-is
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthCheck {
    /// Empty keeps the image's own HEALTHCHECK command
    #[serde(default)]
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default)]
    pub retries: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    /// Description shown by `--list`
    #[serde(default)]
    pub description: String,

    /// Tasks that must succeed first, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,

    /// Command to run in a container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunConfig>,

    /// Wrap the command in a shell
    #[serde(default)]
    pub shell: bool,

    /// Shell program used when `shell` is set (defaults to `sh`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_executable: Option<String>,

    /// Run inside a docker compose environment
    #[serde(default)]
    pub docker_compose: bool,

    /// Compose file for the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_compose_file: Option<String>,

    /// Bring the environment down after the task, even on failure
    #[serde(default)]
    pub docker_compose_down: bool,
}

/// The `run` block of a task
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Container to run in
    #[serde(default)]
    pub container: String,

    /// Command line; empty uses the image's default command
    #[serde(default)]
    pub command: String,
}
