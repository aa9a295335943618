//! Common test utilities

#![allow(dead_code)]

use ctask::config::{parse_config, Config};
use ctask::runner::{Context, HealthPoller, Verbosity};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory with a ctask.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    create_named_config("ctask.yml", content)
}

/// Create a temporary directory with a config file of the given name
pub fn create_named_config(file_name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(file_name);
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Parse a config that is expected to be valid
pub fn config(yaml: &str) -> Config {
    parse_config(yaml).unwrap()
}

/// A context that prints nothing
pub fn silent_context() -> Context {
    Context::new().with_verbosity(Verbosity::Silent)
}

/// A poller with millisecond timings
pub fn fast_poller(timeout_ms: u64) -> HealthPoller {
    HealthPoller::new(Duration::from_millis(timeout_ms), Duration::from_millis(5))
}

/// The project used by most scenarios
pub const PROJECT: &str = r#"
containers:
  tools:
    image: rust:1.75
    volumes:
      - local: .
        container: /src
    working_directory: /src
  api:
    build: ./api
    healthcheck:
      command: curl -f http://localhost:8080/health
      interval: 2s
      retries: 3

tasks:
  lint:
    description: Lints the code
    run:
      container: tools
      command: cargo clippy
  test:
    description: Runs tests
    run:
      container: tools
      command: cargo test
  build-app:
    description: Lints and tests
    prerequisites: [lint, test]
  serve:
    description: Serves the api
    docker_compose: true
    docker_compose_down: true
    run:
      container: api
      command: ./serve
"#;
