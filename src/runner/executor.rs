//! Task orchestration
//!
//! Tasks run depth-first: prerequisites in declaration order, then the
//! task's environment, then its command. Each task runs at most once per
//! [`Context`].

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{
    build_run_request, display_command, Context, EnvironmentLifecycle, HealthPoller,
    ImageBuilder, RunInstruction, Task,
};
use tracing::{debug, instrument};

/// Executes tasks from a configuration against an engine
pub struct Executor<'a> {
    config: &'a Config,
    engine: &'a dyn Engine,
    poller: HealthPoller,
}

impl<'a> Executor<'a> {
    pub fn new(config: &'a Config, engine: &'a dyn Engine) -> Self {
        Executor {
            config,
            engine,
            poller: HealthPoller::default(),
        }
    }

    /// Replace the health poller used to gate environments
    pub fn with_poller(mut self, poller: HealthPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Execute `name` and everything it depends on
    #[instrument(skip(self, ctx))]
    pub fn execute(&self, name: &str, ctx: &mut Context) -> ExecutionResult<()> {
        let config = self
            .config
            .tasks
            .get(name)
            .ok_or_else(|| ExecutionError::TaskNotFound(name.to_string()))?;

        if ctx.is_satisfied(name) {
            debug!("already satisfied");
            return Ok(());
        }

        // Re-entering an unfinished task
        if ctx.is_in_progress(name) {
            return Err(ExecutionError::CircularDependency(ctx.cycle_chain(name)));
        }

        let task = Task::from_config(name.to_string(), config.clone());
        if task.is_empty() {
            return Err(ExecutionError::EmptyTask(task.name));
        }

        ctx.enter(&task.name);
        let result = self.execute_task(&task, ctx);
        ctx.leave();

        if result.is_ok() {
            ctx.mark_satisfied(&task.name);
            ctx.print_task_complete(&task.name);
        }

        result
    }

    fn execute_task(&self, task: &Task, ctx: &mut Context) -> ExecutionResult<()> {
        if task.run.is_none() {
            ctx.print_task_start(&task.name);
        }

        for prerequisite in &task.prerequisites {
            self.execute(prerequisite, ctx)
                .map_err(|e| ExecutionError::Prerequisite {
                    task: prerequisite.clone(),
                    source: Box::new(e),
                })?;
        }

        let Some(run) = &task.run else {
            if let Some(environment) = &task.environment {
                // Nothing to run, but the environment still goes up and down
                let lifecycle = EnvironmentLifecycle::new(self.engine, &self.poller);
                let _guard = lifecycle.start_and_gate(environment, None, ctx)?;
            }
            return Ok(());
        };

        ctx.print_task_start(&task.name);

        match &task.environment {
            Some(environment) => {
                let healthcheck = self
                    .config
                    .containers
                    .get(&run.container)
                    .and_then(|c| c.healthcheck.as_ref());
                let lifecycle = EnvironmentLifecycle::new(self.engine, &self.poller);
                let guard = lifecycle.start_and_gate(
                    environment,
                    Some((run.container.as_str(), healthcheck)),
                    ctx,
                )?;

                let argv = run.exec_argv(&task.name)?;
                ctx.print_command(&display_command(&argv));
                self.engine
                    .compose_exec(
                        guard.environment().compose_file.as_deref(),
                        &run.container,
                        &argv,
                    )
                    .map_err(|source| ExecutionError::RunFailed {
                        task: task.name.clone(),
                        source,
                    })
            }
            None => self.run_in_container(task, run, ctx),
        }
    }

    fn run_in_container(
        &self,
        task: &Task,
        run: &RunInstruction,
        ctx: &mut Context,
    ) -> ExecutionResult<()> {
        let container = self.config.containers.get(&run.container).ok_or_else(|| {
            ExecutionError::ContainerNotFound {
                task: task.name.clone(),
                container: run.container.clone(),
            }
        })?;

        let image = ImageBuilder::new(self.engine).resolve_image(&run.container, container, ctx)?;
        let request = build_run_request(&task.name, run, container, image, ctx)?;

        let mut words: Vec<String> = request.entrypoint.iter().cloned().collect();
        words.extend(request.args.iter().cloned());
        ctx.print_command(&format!("[{}] {}", request.image, display_command(&words)));

        self.engine
            .run_container(&request)
            .map_err(|source| ExecutionError::RunFailed {
                task: task.name.clone(),
                source,
            })
    }
}
