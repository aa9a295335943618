//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Config, Container};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    for (name, container) in &config.containers {
        validate_container(name, container)?;
    }

    // Check for circular dependencies between tasks
    detect_circular_task_dependencies(config)?;

    Ok(())
}

/// Validate a single container
pub fn validate_container(name: &str, container: &Container) -> ConfigResult<()> {
    for volume in &container.volumes {
        if volume.local.trim().is_empty() || volume.container.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Container '{}' has a volume with an empty path",
                name
            )));
        }
    }

    Ok(())
}

/// Detect cycles in task prerequisites
fn detect_circular_task_dependencies(config: &Config) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for task_name in config.task_names() {
        let mut stack = Vec::new();
        check_task_cycle(config, task_name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in task prerequisites
fn check_task_cycle<'a>(
    config: &'a Config,
    task_name: &'a str,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> ConfigResult<()> {
    // Check if we've found a cycle
    if stack.contains(&task_name) {
        stack.push(task_name);
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }

    // Skip if already fully processed
    if visited.contains(task_name) {
        return Ok(());
    }

    // Unknown names are reported when the executor reaches them
    let Some(task) = config.tasks.get(task_name) else {
        return Ok(());
    };

    stack.push(task_name);

    for prerequisite in &task.prerequisites {
        check_task_cycle(config, prerequisite, visited, stack)?;
    }

    // Remove from stack and mark as visited
    stack.pop();
    visited.insert(task_name);

    Ok(())
}
