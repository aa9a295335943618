//! Command construction
//!
//! This module turns a task's run instruction and its container
//! definition into a request the engine can execute.

use crate::config::Container;
use crate::engine::{Mount, RunRequest};
use crate::error::ExecutionResult;
use crate::runner::{split_command, Context, RunInstruction};

/// Build the request for running `run` in a fresh container from `image`
pub fn build_run_request(
    task: &str,
    run: &RunInstruction,
    container: &Container,
    image: String,
    ctx: &Context,
) -> ExecutionResult<RunRequest> {
    let mounts = container
        .volumes
        .iter()
        .map(|volume| Mount {
            // join keeps absolute paths untouched
            source: ctx.working_dir.join(&volume.local),
            target: volume.container.clone(),
        })
        .collect();

    let (entrypoint, args) = match &run.shell {
        Some(shell) => (
            Some(shell.clone()),
            vec!["-c".to_string(), run.command.clone()],
        ),
        None => (None, split_command(task, &run.command)?),
    };

    Ok(RunRequest {
        image,
        mounts,
        working_dir: container
            .working_directory
            .clone()
            .filter(|d| !d.trim().is_empty()),
        healthcheck: container.healthcheck.clone(),
        entrypoint,
        args,
    })
}

/// Human-readable rendering of a command line, quoting where needed
pub fn display_command(words: &[String]) -> String {
    shell_words::join(words)
}
