//! Health polling
//!
//! Samples a container's status at a fixed interval until it reports
//! healthy, reports unhealthy, or the deadline passes. The deadline is a
//! hard bound: no sample is taken once it has elapsed.

use crate::engine::Engine;
use crate::error::{ExecutionError, ExecutionResult, HealthFailure};
use serde_json::Value;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default upper bound on waiting for a container
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default time between samples
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of log lines attached to a failure
pub const DEFAULT_LOG_TAIL: usize = 20;

/// Health reported by a single status sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    /// Starting, no health check, or anything else inconclusive
    Pending,
}

impl HealthStatus {
    /// Classify status text returned by the engine
    ///
    /// JSON output with a `Health` field is matched exactly. Anything else
    /// falls back to substring matching, checking "unhealthy" first since
    /// it contains "healthy".
    pub fn parse(text: &str) -> HealthStatus {
        if let Some(status) = Self::from_json(text) {
            return status;
        }

        if text.contains("unhealthy") {
            HealthStatus::Unhealthy
        } else if text.contains("healthy") {
            HealthStatus::Healthy
        } else {
            HealthStatus::Pending
        }
    }

    fn from_json(text: &str) -> Option<HealthStatus> {
        let trimmed = text.trim();
        // Either one object per line or a single array
        let values: Vec<Value> = match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => items,
            Ok(value) => vec![value],
            Err(_) => trimmed
                .lines()
                .filter_map(|line| serde_json::from_str(line).ok())
                .collect(),
        };

        let health = values
            .iter()
            .find_map(|v| v.get("Health").and_then(Value::as_str))?;

        Some(match health {
            "healthy" => HealthStatus::Healthy,
            "unhealthy" => HealthStatus::Unhealthy,
            _ => HealthStatus::Pending,
        })
    }
}

/// States of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Healthy,
    Unhealthy,
    TimedOut,
}

impl PollState {
    fn after(status: HealthStatus) -> PollState {
        match status {
            HealthStatus::Healthy => PollState::Healthy,
            HealthStatus::Unhealthy => PollState::Unhealthy,
            HealthStatus::Pending => PollState::Polling,
        }
    }
}

/// Bounded, fixed-interval health poller
#[derive(Debug, Clone)]
pub struct HealthPoller {
    pub timeout: Duration,
    pub interval: Duration,
    pub log_tail: usize,
}

impl Default for HealthPoller {
    fn default() -> Self {
        HealthPoller {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            log_tail: DEFAULT_LOG_TAIL,
        }
    }
}

impl HealthPoller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        HealthPoller {
            timeout,
            interval,
            ..Default::default()
        }
    }

    /// Block until `container` is healthy
    ///
    /// Unhealthy and timed-out containers fail with their recent logs attached.
    pub fn wait_until_healthy(
        &self,
        engine: &dyn Engine,
        compose_file: Option<&Path>,
        container: &str,
    ) -> ExecutionResult<()> {
        let deadline = Instant::now() + self.timeout;
        let mut state = PollState::Polling;

        while state == PollState::Polling {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                state = PollState::TimedOut;
                break;
            }

            thread::sleep(self.interval.min(remaining));
            if Instant::now() >= deadline {
                state = PollState::TimedOut;
                break;
            }

            let text = engine
                .compose_status(compose_file, container)
                .map_err(|e| ExecutionError::HealthCheckFailed {
                    container: container.to_string(),
                    reason: HealthFailure::StatusQuery(e.to_string()),
                    logs: String::new(),
                })?;

            let status = HealthStatus::parse(&text);
            debug!(container, ?status, "health sample");
            state = PollState::after(status);
        }

        let reason = match state {
            PollState::Healthy => return Ok(()),
            PollState::Unhealthy => HealthFailure::Unhealthy,
            PollState::TimedOut | PollState::Polling => HealthFailure::TimedOut(self.timeout),
        };

        let logs = engine
            .compose_logs(compose_file, container, self.log_tail)
            .unwrap_or_else(|e| format!("(failed to fetch logs: {})", e));

        Err(ExecutionError::HealthCheckFailed {
            container: container.to_string(),
            reason,
            logs,
        })
    }
}
