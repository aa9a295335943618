//! Integration tests for task execution

mod common;

use common::{config, fast_poller, silent_context, PROJECT};
use ctask::engine::ScriptedEngine;
use ctask::error::{ExecutionError, HealthFailure};
use ctask::runner::Executor;

#[test]
fn test_build_app_runs_prerequisites_only() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new();
    let mut ctx = silent_context();

    Executor::new(&config, &engine)
        .execute("build-app", &mut ctx)
        .unwrap();

    assert_eq!(
        engine.calls(),
        vec!["run rust:1.75 cargo clippy", "run rust:1.75 cargo test"]
    );
    for task in ["lint", "test", "build-app"] {
        assert!(ctx.is_satisfied(task), "{} not satisfied", task);
    }
}

#[test]
fn test_diamond_dependency_runs_once() {
    let config = config(
        r#"
containers:
  tools: {image: alpine}
tasks:
  deps:
    run: {container: tools, command: fetch}
  left:
    prerequisites: [deps]
    run: {container: tools, command: left}
  right:
    prerequisites: [deps]
    run: {container: tools, command: right}
  all:
    prerequisites: [left, right]
"#,
    );
    let engine = ScriptedEngine::new();

    Executor::new(&config, &engine)
        .execute("all", &mut silent_context())
        .unwrap();

    assert_eq!(engine.count("run alpine fetch"), 1);
    assert_eq!(
        engine.calls(),
        vec!["run alpine fetch", "run alpine left", "run alpine right"]
    );
}

#[test]
fn test_prerequisite_failure_aborts_remaining_work() {
    let config = config(
        r#"
containers:
  tools: {image: alpine}
  broken: {image: broken}
tasks:
  first:
    run: {container: tools, command: one}
  failing:
    run: {container: broken, command: two}
  last:
    run: {container: tools, command: three}
  all:
    prerequisites: [first, failing, last]
    run: {container: tools, command: four}
"#,
    );
    let engine = ScriptedEngine::new().fail_on("run:broken");
    let mut ctx = silent_context();

    let err = Executor::new(&config, &engine)
        .execute("all", &mut ctx)
        .unwrap_err();

    assert_eq!(err.task_chain(), vec!["failing"]);
    assert!(matches!(
        err.root_cause(),
        ExecutionError::RunFailed { task, .. } if task == "failing"
    ));
    assert_eq!(engine.calls(), vec!["run alpine one", "run broken two"]);
    // Completed prerequisites stay completed
    assert!(ctx.is_satisfied("first"));
    assert!(!ctx.is_satisfied("all"));
}

#[test]
fn test_missing_prerequisite_is_reported_through_chain() {
    let config = config(
        r#"
tasks:
  outer:
    prerequisites: [inner]
  inner:
    prerequisites: [ghost]
"#,
    );
    let engine = ScriptedEngine::new();

    let err = Executor::new(&config, &engine)
        .execute("outer", &mut silent_context())
        .unwrap_err();

    assert_eq!(err.task_chain(), vec!["inner", "ghost"]);
    assert!(matches!(
        err.root_cause(),
        ExecutionError::TaskNotFound(name) if name == "ghost"
    ));
    assert!(err.to_string().contains("inner"));
}

#[test]
fn test_empty_task_is_rejected() {
    let config = config(
        r#"
tasks:
  nothing:
    description: Does nothing
  wrapper:
    prerequisites: [nothing]
"#,
    );
    let engine = ScriptedEngine::new();
    let executor = Executor::new(&config, &engine);

    let direct = executor.execute("nothing", &mut silent_context());
    assert!(matches!(direct, Err(ExecutionError::EmptyTask(name)) if name == "nothing"));

    let nested = executor
        .execute("wrapper", &mut silent_context())
        .unwrap_err();
    assert!(matches!(nested.root_cause(), ExecutionError::EmptyTask(_)));
}

#[test]
fn test_runtime_cycle_is_detected() {
    let config = config(
        r#"
tasks:
  a:
    prerequisites: [b]
  b:
    prerequisites: [a]
"#,
    );
    let engine = ScriptedEngine::new();
    let mut ctx = silent_context();

    let err = Executor::new(&config, &engine)
        .execute("a", &mut ctx)
        .unwrap_err();

    match err.root_cause() {
        ExecutionError::CircularDependency(chain) => assert_eq!(chain, "a -> b -> a"),
        other => panic!("expected CircularDependency, got {:?}", other),
    }
    assert!(ctx.in_progress.is_empty());
    assert!(ctx.satisfied.is_empty());
}

#[test]
fn test_unknown_container() {
    let config = config(
        r#"
tasks:
  orphan:
    run: {container: nowhere, command: ls}
"#,
    );
    let engine = ScriptedEngine::new();

    let err = Executor::new(&config, &engine)
        .execute("orphan", &mut silent_context())
        .unwrap_err();

    assert!(matches!(
        err,
        ExecutionError::ContainerNotFound { ref task, ref container }
            if task == "orphan" && container == "nowhere"
    ));
    assert!(engine.calls().is_empty());
}

#[test]
fn test_built_image_is_reused_across_tasks() {
    let config = config(
        r#"
containers:
  app: {build: ./app}
tasks:
  unit:
    run: {container: app, command: make unit}
  e2e:
    run: {container: app, command: make e2e}
  ci:
    prerequisites: [unit, e2e]
"#,
    );
    let engine = ScriptedEngine::new();

    Executor::new(&config, &engine)
        .execute("ci", &mut silent_context())
        .unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            "build:buildkit ctask_app ./app",
            "run ctask_app make unit",
            "run ctask_app make e2e",
        ]
    );
}

#[test]
fn test_build_fallback_then_run() {
    let config = config(
        r#"
containers:
  app: {build: ./app}
tasks:
  unit:
    run: {container: app, command: make unit}
"#,
    );
    let engine = ScriptedEngine::new().fail_on("build:buildkit");

    Executor::new(&config, &engine)
        .execute("unit", &mut silent_context())
        .unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            "build:buildkit ctask_app ./app",
            "build:legacy ctask_app ./app",
            "run ctask_app make unit",
        ]
    );
}

#[test]
fn test_build_failure_stops_before_run() {
    let config = config(
        r#"
containers:
  app: {build: ./app}
tasks:
  unit:
    run: {container: app, command: make unit}
"#,
    );
    let engine = ScriptedEngine::new().fail_on("build");

    let err = Executor::new(&config, &engine)
        .execute("unit", &mut silent_context())
        .unwrap_err();

    assert!(matches!(err, ExecutionError::BuildFailed { .. }));
    assert_eq!(engine.count("run"), 0);
}

#[test]
fn test_serve_never_healthy_fails_with_logs_and_tears_down() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new()
        .with_statuses(["starting"])
        .with_logs("api | listening on :8081\napi | health endpoint missing");
    let mut ctx = silent_context();

    let err = Executor::new(&config, &engine)
        .with_poller(fast_poller(40))
        .execute("serve", &mut ctx)
        .unwrap_err();

    match &err {
        ExecutionError::HealthCheckFailed { reason, .. } => {
            assert!(matches!(reason, HealthFailure::TimedOut(_)))
        }
        other => panic!("expected HealthCheckFailed, got {:?}", other),
    }
    let (container, logs) = err.health_logs().unwrap();
    assert_eq!(container, "api");
    assert!(logs.contains("health endpoint missing"));

    let calls = engine.calls();
    assert_eq!(calls.first().map(String::as_str), Some("up"));
    assert_eq!(calls.last().map(String::as_str), Some("down"));
    assert_eq!(engine.count("down"), 1);
    assert_eq!(engine.count("exec"), 0);
    assert!(!ctx.is_satisfied("serve"));
}

#[test]
fn test_serve_healthy_execs_then_tears_down() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new().with_statuses(["starting", "healthy"]);

    Executor::new(&config, &engine)
        .with_poller(fast_poller(500))
        .execute("serve", &mut silent_context())
        .unwrap();

    assert_eq!(
        engine.calls(),
        vec!["up", "status api", "status api", "exec api ./serve", "down"]
    );
}

#[test]
fn test_teardown_runs_when_command_fails() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new()
        .with_statuses(["healthy"])
        .fail_on("exec:api");

    let err = Executor::new(&config, &engine)
        .with_poller(fast_poller(500))
        .execute("serve", &mut silent_context())
        .unwrap_err();

    assert!(matches!(err, ExecutionError::RunFailed { .. }));
    assert_eq!(engine.count("down"), 1);
    assert_eq!(engine.calls().last().map(String::as_str), Some("down"));
}

#[test]
fn test_environment_start_failure() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new().fail_on("up");

    let err = Executor::new(&config, &engine)
        .execute("serve", &mut silent_context())
        .unwrap_err();

    assert!(matches!(err, ExecutionError::EnvironmentStartFailed(_)));
    assert_eq!(engine.calls(), vec!["up"]);
}

#[test]
fn test_separate_contexts_do_not_share_state() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new();
    let executor = Executor::new(&config, &engine);

    executor.execute("lint", &mut silent_context()).unwrap();
    executor.execute("lint", &mut silent_context()).unwrap();

    assert_eq!(engine.count("run"), 2);
}

#[test]
fn test_same_context_does_not_rerun() {
    let config = config(PROJECT);
    let engine = ScriptedEngine::new();
    let executor = Executor::new(&config, &engine);
    let mut ctx = silent_context();

    executor.execute("lint", &mut ctx).unwrap();
    executor.execute("build-app", &mut ctx).unwrap();

    assert_eq!(engine.count("run rust:1.75 cargo clippy"), 1);
    assert_eq!(engine.count("run"), 2);
}
