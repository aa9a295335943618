//! Multi-container environment lifecycle
//!
//! Starting an environment hands back an [`EnvironmentGuard`]. Dropping the
//! guard brings the environment down when the task asked for teardown, so
//! release happens on every exit path including early returns through `?`.

use crate::config::HealthCheck;
use crate::engine::Engine;
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{Context, Environment, HealthPoller, Verbosity};
use colored::Colorize;
use tracing::{debug, warn};

/// Starts environments and gates them on readiness
pub struct EnvironmentLifecycle<'a> {
    engine: &'a dyn Engine,
    poller: &'a HealthPoller,
}

impl<'a> EnvironmentLifecycle<'a> {
    pub fn new(engine: &'a dyn Engine, poller: &'a HealthPoller) -> Self {
        EnvironmentLifecycle { engine, poller }
    }

    /// Bring `environment` up and wait for `target` to become ready
    ///
    /// `target` names the container the task will run in, with its declared
    /// health check if any. Without a health check the environment is ready
    /// as soon as it has started.
    pub fn start_and_gate<'e>(
        &self,
        environment: &'e Environment,
        target: Option<(&str, Option<&HealthCheck>)>,
        ctx: &Context,
    ) -> ExecutionResult<EnvironmentGuard<'e>>
    where
        'a: 'e,
    {
        ctx.print_info("Starting docker compose environment...");
        let file = environment.compose_file.as_deref();
        self.engine
            .compose_up(file)
            .map_err(ExecutionError::EnvironmentStartFailed)?;

        // From here on the environment exists and must be released
        let guard = EnvironmentGuard {
            engine: self.engine,
            environment,
            verbosity: ctx.verbosity,
        };

        match target {
            Some((container, Some(_))) => {
                ctx.print_info(&format!("Waiting for '{}' to become healthy...", container));
                self.poller.wait_until_healthy(self.engine, file, container)?;
                ctx.print_info(&format!("Container '{}' is healthy", container));
            }
            Some((container, None)) => {
                debug!(container, "no health check declared, skipping gate");
            }
            None => {}
        }

        Ok(guard)
    }
}

/// Scoped ownership of a started environment
#[must_use = "dropping the guard immediately tears the environment down"]
pub struct EnvironmentGuard<'a> {
    engine: &'a dyn Engine,
    environment: &'a Environment,
    verbosity: Verbosity,
}

impl EnvironmentGuard<'_> {
    pub fn environment(&self) -> &Environment {
        self.environment
    }
}

impl Drop for EnvironmentGuard<'_> {
    fn drop(&mut self) {
        if !self.environment.teardown {
            return;
        }

        if self.verbosity >= Verbosity::Normal {
            eprintln!(
                "{} Stopping docker compose environment...",
                "[INFO]".blue().bold()
            );
        }

        if let Err(e) = self
            .engine
            .compose_down(self.environment.compose_file.as_deref())
        {
            warn!(error = %e, "environment teardown failed");
            if self.verbosity >= Verbosity::Quiet {
                eprintln!(
                    "{} Failed to stop environment: {}",
                    "[WARN]".yellow().bold(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptedEngine;
    use crate::error::HealthFailure;
    use std::time::Duration;

    fn ctx() -> Context {
        Context::new().with_verbosity(Verbosity::Silent)
    }

    fn poller() -> HealthPoller {
        HealthPoller::new(Duration::from_millis(50), Duration::from_millis(5))
    }

    fn env(teardown: bool) -> Environment {
        Environment {
            compose_file: None,
            teardown,
        }
    }

    fn check() -> HealthCheck {
        HealthCheck {
            command: "curl -f localhost".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_teardown_runs_once_on_drop() {
        let engine = ScriptedEngine::new().with_statuses(["healthy"]);
        let poller = poller();
        let environment = env(true);
        let check = check();

        {
            let guard = EnvironmentLifecycle::new(&engine, &poller)
                .start_and_gate(&environment, Some(("api", Some(&check))), &ctx())
                .unwrap();
            assert!(guard.environment().teardown);
            assert_eq!(engine.count("down"), 0);
        }

        assert_eq!(engine.calls(), vec!["up", "status api", "down"]);
    }

    #[test]
    fn test_no_teardown_when_not_requested() {
        let engine = ScriptedEngine::new();
        let poller = poller();
        let environment = env(false);

        let guard = EnvironmentLifecycle::new(&engine, &poller)
            .start_and_gate(&environment, Some(("api", None)), &ctx())
            .unwrap();
        drop(guard);

        assert_eq!(engine.calls(), vec!["up"]);
    }

    #[test]
    fn test_gate_failure_still_tears_down() {
        let engine = ScriptedEngine::new()
            .with_statuses(["unhealthy"])
            .with_logs("boom");
        let poller = poller();
        let environment = env(true);
        let check = check();

        let result = EnvironmentLifecycle::new(&engine, &poller).start_and_gate(
            &environment,
            Some(("api", Some(&check))),
            &ctx(),
        );

        match result {
            Err(ExecutionError::HealthCheckFailed { reason, .. }) => {
                assert_eq!(reason, HealthFailure::Unhealthy)
            }
            Err(other) => panic!("expected HealthCheckFailed, got {:?}", other),
            Ok(_) => panic!("expected HealthCheckFailed"),
        }
        assert_eq!(engine.count("down"), 1);
        assert_eq!(engine.calls().last().map(String::as_str), Some("down"));
    }

    #[test]
    fn test_start_failure_skips_gate_and_teardown() {
        let engine = ScriptedEngine::new().fail_on("up");
        let poller = poller();
        let environment = env(true);
        let check = check();

        let result = EnvironmentLifecycle::new(&engine, &poller).start_and_gate(
            &environment,
            Some(("api", Some(&check))),
            &ctx(),
        );

        assert!(matches!(
            result,
            Err(ExecutionError::EnvironmentStartFailed(_))
        ));
        assert_eq!(engine.calls(), vec!["up"]);
    }

    #[test]
    fn test_teardown_failure_is_swallowed() {
        let engine = ScriptedEngine::new().fail_on("down");
        let poller = poller();
        let environment = env(true);

        let guard = EnvironmentLifecycle::new(&engine, &poller)
            .start_and_gate(&environment, None, &ctx())
            .unwrap();
        drop(guard);

        assert_eq!(engine.calls(), vec!["up", "down"]);
    }
}
