//! Library builds: fetch, drive and record.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::builder::{cmake, make, BuildRequest, BuildVariant};
use crate::core::error::BuildError;
use crate::core::state::OrchestratorState;
use crate::ops::provision::{provision_cmake, provision_ninja};
use crate::recipes::{boost, DependencyPrefixes, Driver, Library, RecipePlan};
use crate::sources::archive::fetch_and_extract;
use crate::tools::{CMAKE_VERSION, NINJA_VERSION};
use crate::util::config::Config;
use crate::util::shell::Status;

/// Per-library overrides.
#[derive(Debug, Clone, Default)]
pub struct LibraryOptions {
    /// Version to build instead of the recipe default
    pub version: Option<String>,
    pub prefix_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub variant: BuildVariant,
}

impl LibraryOptions {
    /// Options carrying only the configured version of `library`.
    pub fn from_config(config: &Config, library: Library) -> Self {
        LibraryOptions {
            version: config.version_for(library.key()).map(str::to_string),
            ..LibraryOptions::default()
        }
    }
}

/// Plan a library build against the prefixes recorded so far.
pub fn plan_library(
    state: &OrchestratorState,
    library: Library,
    options: &LibraryOptions,
) -> Result<(RecipePlan, DependencyPrefixes), BuildError> {
    let version = options
        .version
        .as_deref()
        .unwrap_or_else(|| library.default_version());
    let deps = DependencyPrefixes::resolve(library, &state.prefixes);
    let plan = library.plan(version, &deps)?;
    Ok((plan, deps))
}

/// Fetch, build and install one library, recording its prefix.
pub fn build_library(
    ctx: &BuildContext<'_>,
    state: &mut OrchestratorState,
    library: Library,
    options: &LibraryOptions,
) -> Result<PathBuf> {
    state.tools.ensure_provisioned()?;
    if state.prefixes.recorded_this_run(library.key()) {
        return Err(BuildError::PrefixAlreadyRecorded(library.key().to_string()).into());
    }

    let (plan, deps) = plan_library(state, library, options)?;
    check_options(library, &plan.driver, options)?;
    for missing in deps.missing() {
        ctx.shell.warn(format!(
            "`{}` depends on `{}`, which has no recorded prefix",
            library, missing
        ));
    }

    tracing::info!("building {} {} with {}", library, plan.version, plan.driver.name());
    fetch_and_extract(ctx, &plan.url, plan.label)?;

    let source_dir = ctx.resolve(&plan.source_dir);
    if !source_dir.is_dir() {
        return Err(BuildError::SourceDirMissing { path: source_dir })
            .with_context(|| format!("{} did not unpack into the expected directory", plan.label));
    }

    let request = BuildRequest {
        source_dir: plan.source_dir.clone(),
        prefix_dir: options.prefix_dir.clone(),
        build_dir: options.build_dir.clone(),
        variant: options.variant,
    };

    let prefix = match &plan.driver {
        Driver::CMake { defines } => cmake::build(ctx, state, &request, defines),
        Driver::Make {
            configure_args,
            prefix_flag,
        } => make::build(ctx, state, &request, configure_args, *prefix_flag),
        Driver::Boost(params) => boost::build(ctx, state, &request, params),
    }
    .with_context(|| format!("failed to build {} {}", library, plan.version))?;

    state.prefixes.record(library.key(), prefix.clone())?;
    ctx.shell.status(
        Status::Installed,
        format!("{} {} to {}", library, plan.version, prefix.display()),
    );
    Ok(prefix)
}

/// Refuse overrides the library's driver would silently drop.
fn check_options(
    library: Library,
    driver: &Driver,
    options: &LibraryOptions,
) -> Result<(), BuildError> {
    let unsupported = |option: String| BuildError::UnsupportedOption {
        library: library.key().to_string(),
        option,
    };

    if options.build_dir.is_some() && !driver.takes_build_dir() {
        return Err(unsupported("--build-dir".to_string()));
    }
    if options.variant != BuildVariant::Release && !driver.takes_variant() {
        return Err(unsupported(format!("--build-type {}", options.variant)));
    }
    Ok(())
}

/// Provision both tools, then build every library in order.
///
/// `checkpoint` runs after each successful step, so a failure later in the
/// run leaves earlier results persisted.
pub fn build_all(
    ctx: &BuildContext<'_>,
    state: &mut OrchestratorState,
    config: &Config,
    mut checkpoint: impl FnMut(&OrchestratorState) -> Result<()>,
) -> Result<Vec<(Library, PathBuf)>> {
    let cmake_version = config.tools.cmake.as_deref().unwrap_or(CMAKE_VERSION);
    let ninja_version = config.tools.ninja.as_deref().unwrap_or(NINJA_VERSION);

    provision_cmake(ctx, state, cmake_version)?;
    checkpoint(state)?;
    provision_ninja(ctx, state, ninja_version)?;
    checkpoint(state)?;

    let mut installed = Vec::with_capacity(Library::ALL.len());
    for library in Library::ALL {
        let options = LibraryOptions::from_config(config, library);
        let prefix = build_library(ctx, state, library, &options)?;
        checkpoint(state)?;
        installed.push((library, prefix));
    }

    ctx.shell
        .status(Status::Finished, format!("{} libraries", installed.len()));
    Ok(installed)
}
