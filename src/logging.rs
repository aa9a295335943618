//! Diagnostic logging
//!
//! Internal diagnostics go through `tracing` and are written to stderr, so
//! stdout stays reserved for listings and forwarded container output.
//! User-facing progress lines are printed by [`crate::runner::Context`].
//!
//! ## Environment Variables
//!
//! * `CTASK_LOG` - filter directives, e.g. `ctask=debug`
//! * `RUST_LOG` - used when `CTASK_LOG` is unset
//! * `CTASK_LOG_FORMAT` - `json` for structured output, anything else for text

use crate::runner::Verbosity;
use anyhow::{Context as _, Result};
use std::{env, io, sync::Once};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: Verbosity) -> Result<()> {
    let mut outcome = Ok(());
    INIT.call_once(|| outcome = install(verbosity));
    outcome
}

fn install(verbosity: Verbosity) -> Result<()> {
    let filter = create_env_filter(verbosity);
    let format = env::var("CTASK_LOG_FORMAT").unwrap_or_default();

    match format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
            .with(filter)
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .with(filter)
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    tracing::debug!(format = %format, "logging initialized");
    Ok(())
}

fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Verbose => "debug",
        _ => "warn",
    }
}

fn create_env_filter(verbosity: Verbosity) -> EnvFilter {
    let fallback = default_directive(verbosity);
    match env::var("CTASK_LOG") {
        Ok(directives) => EnvFilter::try_new(&directives).unwrap_or_else(|_| {
            eprintln!(
                "Invalid CTASK_LOG directives '{}', using '{}'",
                directives, fallback
            );
            EnvFilter::new(fallback)
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
    }
}
