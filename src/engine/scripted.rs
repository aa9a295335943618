//! Scripted engine that records calls instead of running containers.
//!
//! Each operation is appended to a call log as a single line of text and
//! succeeds unless one of its failure keys was registered with
//! [`ScriptedEngine::fail_on`]. Failure keys are the operation name alone
//! (`"run"`) or the operation plus its target (`"run:alpine"`,
//! `"build:buildkit"`, `"build:legacy:ctask_api"`, `"exec:api"`).

use crate::engine::{BuildStrategy, Engine, EngineError, EngineResult, RunRequest};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct ScriptState {
    calls: Vec<String>,
    failures: HashSet<String>,
    statuses: VecDeque<String>,
    logs: String,
}

/// Engine that replays scripted outcomes
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    state: Mutex<ScriptState>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation matching `key` fail
    pub fn fail_on(self, key: impl Into<String>) -> Self {
        self.lock().failures.insert(key.into());
        self
    }

    /// Status texts returned by successive status queries; the last one repeats
    pub fn with_statuses<I, S>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Text returned by log queries
    pub fn with_logs(self, logs: impl Into<String>) -> Self {
        self.lock().logs = logs.into();
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls whose text starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String, keys: &[String]) -> EngineResult<()> {
        let mut state = self.lock();
        state.calls.push(call);
        match keys.iter().find(|k| state.failures.contains(*k)) {
            Some(key) => Err(EngineError::Exit {
                operation: key.clone(),
                code: Some(1),
            }),
            None => Ok(()),
        }
    }
}

fn line(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Engine for ScriptedEngine {
    fn build_image(&self, context: &Path, tag: &str, strategy: BuildStrategy) -> EngineResult<()> {
        let op = format!("build:{}", strategy);
        let context = context.display().to_string();
        self.record(
            line(&[op.as_str(), tag, context.as_str()]),
            &["build".to_string(), op.clone(), format!("{}:{}", op, tag)],
        )
    }

    fn run_container(&self, request: &RunRequest) -> EngineResult<()> {
        let entrypoint = request.entrypoint.as_deref().unwrap_or("");
        let args = request.args.join(" ");
        self.record(
            line(&["run", entrypoint, request.image.as_str(), args.as_str()]),
            &["run".to_string(), format!("run:{}", request.image)],
        )
    }

    fn compose_up(&self, _file: Option<&Path>) -> EngineResult<()> {
        self.record("up".to_string(), &["up".to_string()])
    }

    fn compose_down(&self, _file: Option<&Path>) -> EngineResult<()> {
        self.record("down".to_string(), &["down".to_string()])
    }

    fn compose_exec(
        &self,
        _file: Option<&Path>,
        container: &str,
        argv: &[String],
    ) -> EngineResult<()> {
        let argv = argv.join(" ");
        self.record(
            line(&["exec", container, argv.as_str()]),
            &["exec".to_string(), format!("exec:{}", container)],
        )
    }

    fn compose_status(&self, _file: Option<&Path>, container: &str) -> EngineResult<String> {
        self.record(line(&["status", container]), &["status".to_string()])?;
        let mut state = self.lock();
        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front()
        } else {
            state.statuses.front().cloned()
        };
        Ok(status.unwrap_or_default())
    }

    fn compose_logs(
        &self,
        _file: Option<&Path>,
        container: &str,
        tail: usize,
    ) -> EngineResult<String> {
        self.record(
            line(&["logs", container, tail.to_string().as_str()]),
            &["logs".to_string()],
        )?;
        Ok(self.lock().logs.clone())
    }
}
