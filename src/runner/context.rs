//! Per-invocation execution state
//!
//! A [`Context`] lives for exactly one top-level invocation. It records which
//! tasks finished, which are still running (for cycle detection), and which
//! images were built, and it owns user-facing progress output.

use colored::{ColoredString, Colorize};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::PathBuf;

/// How much progress output to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Quiet,
    Normal,
    Verbose,
}

pub struct Context {
    /// Base for relative volume paths
    pub working_dir: PathBuf,

    /// Tasks entered but not yet finished, outermost first
    pub in_progress: Vec<String>,

    /// Tasks that completed successfully
    pub satisfied: HashSet<String>,

    /// Built image tags by container name
    pub built_images: HashMap<String, String>,

    pub verbosity: Verbosity,
}

impl Context {
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            in_progress: Vec::new(),
            satisfied: HashSet::new(),
            built_images: HashMap::new(),
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Mark `task` as started
    pub fn enter(&mut self, task: &str) {
        self.in_progress.push(task.to_string());
    }

    /// Mark the innermost running task as finished
    pub fn leave(&mut self) {
        self.in_progress.pop();
    }

    pub fn is_in_progress(&self, task: &str) -> bool {
        self.in_progress.iter().any(|t| t == task)
    }

    /// Chain from the first entry of `task` back to `task`, e.g. `a -> b -> a`
    pub fn cycle_chain(&self, task: &str) -> String {
        let start = self
            .in_progress
            .iter()
            .position(|t| t == task)
            .unwrap_or(0);
        self.in_progress[start..]
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(task))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn mark_satisfied(&mut self, task: &str) {
        self.satisfied.insert(task.to_string());
    }

    pub fn is_satisfied(&self, task: &str) -> bool {
        self.satisfied.contains(task)
    }

    /// Tag built earlier in this invocation for `container`
    pub fn built_image(&self, container: &str) -> Option<&str> {
        self.built_images.get(container).map(String::as_str)
    }

    pub fn record_built_image(&mut self, container: &str, tag: &str) {
        self.built_images
            .insert(container.to_string(), tag.to_string());
    }

    fn emit(&self, min: Verbosity, tag: ColoredString, message: &str) {
        if self.verbosity >= min {
            eprintln!("{} {}", tag, message);
        }
    }

    pub fn print_info(&self, message: &str) {
        self.emit(Verbosity::Normal, "[INFO]".blue().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        self.emit(Verbosity::Quiet, "[WARN]".yellow().bold(), message);
    }

    pub fn print_debug(&self, message: &str) {
        self.emit(Verbosity::Verbose, "[DEBUG]".dimmed(), message);
    }

    /// Echo a command about to be dispatched
    pub fn print_command(&self, command: &str) {
        self.emit(Verbosity::Normal, "[RUN]".green().bold(), command);
    }

    pub fn print_task_start(&self, task: &str) {
        self.print_info(&format!("Running task: {}", task));
    }

    pub fn print_task_complete(&self, task: &str) {
        self.print_debug(&format!("Task '{}' done", task));
    }

    /// Print a container's captured log tail
    ///
    /// Shown at every verbosity, since it belongs to the error report.
    pub fn print_logs(&self, container: &str, logs: &str) {
        eprintln!(
            "{} Last log lines for '{}':\n{}",
            "[ERROR]".red().bold(),
            container,
            logs.trim_end()
        );
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
