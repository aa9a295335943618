//! Image resolution
//!
//! Containers either name an image directly or declare a build context.
//! Builds try BuildKit first and fall back to the classic builder; both
//! strategies produce the same tag.

use crate::config::Container;
use crate::engine::{BuildStrategy, Engine};
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use std::path::Path;
use tracing::debug;

/// Prefix of every tag produced by a build
pub const IMAGE_TAG_PREFIX: &str = "ctask_";

/// Tag for images built from a container's build context
pub fn image_tag(container_name: &str) -> String {
    format!("{}{}", IMAGE_TAG_PREFIX, container_name.to_lowercase())
}

/// Resolves containers to runnable image references
pub struct ImageBuilder<'a> {
    engine: &'a dyn Engine,
}

impl<'a> ImageBuilder<'a> {
    pub fn new(engine: &'a dyn Engine) -> Self {
        ImageBuilder { engine }
    }

    /// Image reference for `container`, building it when it has a build context
    pub fn resolve_image(
        &self,
        name: &str,
        container: &Container,
        ctx: &mut Context,
    ) -> ExecutionResult<String> {
        let Some(build_context) = container.build_context() else {
            return container
                .image_ref()
                .map(str::to_string)
                .ok_or_else(|| ExecutionError::MissingImage(name.to_string()));
        };

        if let Some(tag) = ctx.built_image(name) {
            ctx.print_debug(&format!("Image '{}' already built in this run", tag));
            return Ok(tag.to_string());
        }

        let tag = image_tag(name);
        ctx.print_info(&format!("Building image '{}'...", tag));
        self.build(name, Path::new(build_context), &tag, container.legacy_build, ctx)?;

        ctx.record_built_image(name, &tag);
        Ok(tag)
    }

    fn build(
        &self,
        name: &str,
        context: &Path,
        tag: &str,
        force_legacy: bool,
        ctx: &Context,
    ) -> ExecutionResult<()> {
        if force_legacy {
            ctx.print_info(&format!("Forcing legacy build for container '{}'", name));
            return self
                .engine
                .build_image(context, tag, BuildStrategy::Legacy)
                .map_err(|legacy| ExecutionError::BuildFailed {
                    container: name.to_string(),
                    modern: None,
                    legacy,
                });
        }

        let modern = match self.engine.build_image(context, tag, BuildStrategy::BuildKit) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        debug!(error = %modern, container = name, "buildkit build failed");
        ctx.print_warning(&format!(
            "BuildKit build failed ({}), falling back to legacy build",
            modern
        ));

        self.engine
            .build_image(context, tag, BuildStrategy::Legacy)
            .map_err(|legacy| ExecutionError::BuildFailed {
                container: name.to_string(),
                modern: Some(modern),
                legacy,
            })
    }
}
