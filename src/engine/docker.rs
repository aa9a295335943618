//! Docker CLI engine
//!
//! This module runs the `docker` program (or a compatible replacement such as
//! `podman`) as a child process for every engine operation.

use crate::engine::{BuildStrategy, Engine, EngineError, EngineResult, RunRequest};
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use tracing::{debug, instrument};

/// Default engine program
pub const DEFAULT_PROGRAM: &str = "docker";

/// Engine backed by the docker command-line client
#[derive(Debug, Clone)]
pub struct DockerEngine {
    program: String,
}

impl DockerEngine {
    /// Engine using `docker` from `PATH`
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Engine using a specific program
    pub fn with_program(program: impl Into<String>) -> Self {
        DockerEngine {
            program: program.into(),
        }
    }

    /// Run with stdio inherited from this process
    fn run_forwarded(&self, operation: &str, args: &[String], interactive: bool) -> EngineResult<()> {
        debug!(program = %self.program, ?args, "invoking engine");

        let mut command = StdCommand::new(&self.program);
        command.args(args);
        command.stdin(if interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        });
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        let status = command.status().map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(self.exit_error(operation, status.code()));
        }

        Ok(())
    }

    /// Run and capture stdout
    fn run_captured(&self, operation: &str, args: &[String]) -> EngineResult<String> {
        debug!(program = %self.program, ?args, "querying engine");

        let output = StdCommand::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "engine query failed"
            );
            return Err(self.exit_error(operation, output.status.code()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn exit_error(&self, operation: &str, code: Option<i32>) -> EngineError {
        EngineError::Exit {
            operation: format!("{} {}", self.program, operation),
            code,
        }
    }
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for building an image with the given strategy
pub fn build_args(context: &Path, tag: &str, strategy: BuildStrategy) -> Vec<String> {
    let context = context.display().to_string();
    match strategy {
        BuildStrategy::BuildKit => vec![
            "buildx".to_string(),
            "build".to_string(),
            "-t".to_string(),
            tag.to_string(),
            context,
            "--load".to_string(),
        ],
        BuildStrategy::Legacy => vec![
            "build".to_string(),
            "-t".to_string(),
            tag.to_string(),
            context,
        ],
    }
}

/// Arguments for `docker run`
pub fn run_args(request: &RunRequest) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--rm".to_string()];

    for mount in &request.mounts {
        args.push("-v".to_string());
        args.push(format!("{}:{}", mount.source.display(), mount.target));
    }

    if let Some(dir) = &request.working_dir {
        args.push("-w".to_string());
        args.push(dir.clone());
    }

    if let Some(health) = &request.healthcheck {
        if !health.command.is_empty() {
            args.push("--health-cmd".to_string());
            args.push(health.command.clone());
        }
        if let Some(interval) = &health.interval {
            args.push("--health-interval".to_string());
            args.push(interval.clone());
        }
        if let Some(timeout) = &health.timeout {
            args.push("--health-timeout".to_string());
            args.push(timeout.clone());
        }
        if health.retries > 0 {
            args.push("--health-retries".to_string());
            args.push(health.retries.to_string());
        }
        if let Some(start_period) = &health.start_period {
            args.push("--health-start-period".to_string());
            args.push(start_period.clone());
        }
    }

    if let Some(entrypoint) = &request.entrypoint {
        args.push("--entrypoint".to_string());
        args.push(entrypoint.clone());
    }

    args.push(request.image.clone());
    args.extend(request.args.iter().cloned());
    args
}

/// Leading `compose [-f file]` arguments
pub fn compose_args(file: Option<&Path>) -> Vec<String> {
    let mut args = vec!["compose".to_string()];
    if let Some(file) = file {
        args.push("-f".to_string());
        args.push(file.display().to_string());
    }
    args
}

impl Engine for DockerEngine {
    #[instrument(skip(self))]
    fn build_image(&self, context: &Path, tag: &str, strategy: BuildStrategy) -> EngineResult<()> {
        let operation = match strategy {
            BuildStrategy::BuildKit => "buildx build",
            BuildStrategy::Legacy => "build",
        };
        self.run_forwarded(operation, &build_args(context, tag, strategy), false)
    }

    #[instrument(skip(self, request), fields(image = %request.image))]
    fn run_container(&self, request: &RunRequest) -> EngineResult<()> {
        self.run_forwarded("run", &run_args(request), true)
    }

    fn compose_up(&self, file: Option<&Path>) -> EngineResult<()> {
        let mut args = compose_args(file);
        args.extend(["up".to_string(), "-d".to_string()]);
        self.run_forwarded("compose up", &args, false)
    }

    fn compose_down(&self, file: Option<&Path>) -> EngineResult<()> {
        let mut args = compose_args(file);
        args.push("down".to_string());
        self.run_forwarded("compose down", &args, false)
    }

    fn compose_exec(
        &self,
        file: Option<&Path>,
        container: &str,
        argv: &[String],
    ) -> EngineResult<()> {
        let mut args = compose_args(file);
        args.push("exec".to_string());
        args.push(container.to_string());
        args.extend(argv.iter().cloned());
        self.run_forwarded("compose exec", &args, true)
    }

    fn compose_status(&self, file: Option<&Path>, container: &str) -> EngineResult<String> {
        let mut args = compose_args(file);
        args.extend([
            "ps".to_string(),
            container.to_string(),
            "--format".to_string(),
            "json".to_string(),
        ]);
        self.run_captured("compose ps", &args)
    }

    fn compose_logs(
        &self,
        file: Option<&Path>,
        container: &str,
        tail: usize,
    ) -> EngineResult<String> {
        let mut args = compose_args(file);
        args.extend([
            "logs".to_string(),
            "--tail".to_string(),
            tail.to_string(),
            container.to_string(),
        ]);
        self.run_captured("compose logs", &args)
    }
}
