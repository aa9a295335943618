//! Main CLI application

use crate::config::{load_config, validate_config, Config};
use crate::engine::{DockerEngine, Engine};
use crate::error::CtaskError;
use crate::logging;
use crate::runner::{Context, Executor, Verbosity};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// CLI application
pub struct App {
    /// Parsed configuration
    config: Config,
    /// Config file path
    config_path: PathBuf,
}

impl App {
    /// Load and validate configuration, from `file` or the current directory
    pub fn load(file: Option<&Path>) -> Result<Self, CtaskError> {
        let (config, config_path) = load_config(file)?;
        validate_config(&config)?;

        Ok(App {
            config,
            config_path,
        })
    }

    /// Write every task with its description, sorted by name
    pub fn list_tasks<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Available tasks:")?;
        for name in self.config.task_names() {
            let description = self
                .config
                .tasks
                .get(name)
                .map(|t| t.description.as_str())
                .unwrap_or_default();
            writeln!(out, "- {}: {}", name, description)?;
        }
        Ok(())
    }

    /// Execute `task_name` with a fresh execution context
    pub fn run_task(
        &self,
        task_name: &str,
        engine: &dyn Engine,
        ctx: &mut Context,
    ) -> Result<(), CtaskError> {
        ctx.print_debug(&format!("Using config {}", self.config_path.display()));

        Executor::new(&self.config, engine)
            .execute(task_name, ctx)
            .map_err(|e| {
                if let Some((container, logs)) = e.health_logs() {
                    ctx.print_logs(container, logs);
                }
                CtaskError::Task {
                    task: task_name.to_string(),
                    source: e,
                }
            })
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("ctask")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run build and run workflows in containers")
        .arg(
            Arg::new("task")
                .value_name("TASK")
                .help("Name of the task to run"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to the config file"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List available tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("docker-path")
                .long("docker-path")
                .value_name("PATH")
                .help("Container engine executable to invoke [default: docker]"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output, warnings and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output of our own")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), CtaskError> {
    run_from(std::env::args_os())
}

/// Run the CLI application with the given arguments
pub fn run_from<I, T>(args: I) -> Result<(), CtaskError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let verbosity = get_verbosity(&matches);
    logging::init(verbosity)?;

    let app = App::load(matches.get_one::<PathBuf>("file").map(PathBuf::as_path))?;

    if matches.get_flag("list") {
        let stdout = io::stdout();
        app.list_tasks(&mut stdout.lock())?;
        return Ok(());
    }

    let task_name = matches.get_one::<String>("task").ok_or_else(|| {
        CtaskError::Usage("No task specified. Use --list to see available tasks.".to_string())
    })?;

    let engine = matches
        .get_one::<String>("docker-path")
        .map_or_else(DockerEngine::new, |program| {
            DockerEngine::with_program(program.as_str())
        });
    let mut ctx = Context::new().with_verbosity(verbosity);

    app.run_task(task_name, &engine, &mut ctx)
}
