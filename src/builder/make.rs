//! `configure` + make build driver.
//!
//! Every step runs with the build directory as the child's working
//! directory; the orchestrator's own working directory is left alone.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::builder::dirs::allocate_dir;
use crate::builder::BuildRequest;
use crate::core::error::DirKind;
use crate::core::state::OrchestratorState;
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;

/// How a configure script takes its installation prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixFlag {
    /// One argument: `--prefix=<dir>`.
    Assign(&'static str),
    /// Two arguments: `-prefix <dir>`.
    Separate(&'static str),
}

impl PrefixFlag {
    /// Render the flag for a prefix directory.
    pub fn render(&self, prefix: &Path) -> Vec<String> {
        match self {
            PrefixFlag::Assign(flag) => vec![format!("{}{}", flag, prefix.display())],
            PrefixFlag::Separate(flag) => vec![flag.to_string(), prefix.display().to_string()],
        }
    }
}

impl Default for PrefixFlag {
    fn default() -> Self {
        PrefixFlag::Assign("--prefix=")
    }
}

/// The three commands of a configure/make build.
pub fn commands(
    state: &OrchestratorState,
    source_dir: &Path,
    build_dir: &Path,
    prefix: &Path,
    configure_args: &[String],
    prefix_flag: PrefixFlag,
) -> [ProcessBuilder; 3] {
    let make = state.platform.make_program();

    [
        ProcessBuilder::new(source_dir.join("configure"))
            .args(prefix_flag.render(prefix))
            .args(configure_args)
            .cwd(build_dir),
        ProcessBuilder::new(make).cwd(build_dir),
        ProcessBuilder::new(make).arg("install").cwd(build_dir),
    ]
}

/// Configure, make and install an autoconf-style project, returning its prefix.
pub fn build(
    ctx: &BuildContext<'_>,
    state: &OrchestratorState,
    request: &BuildRequest,
    configure_args: &[String],
    prefix_flag: PrefixFlag,
) -> Result<PathBuf> {
    state.tools.ensure_provisioned()?;

    let source_dir = ctx.resolve(&request.source_dir);
    let prefix = allocate_dir(&ctx.work_dir, request.prefix_dir.as_deref(), &source_dir, DirKind::Prefix)?;
    let build_dir = allocate_dir(&ctx.work_dir, request.build_dir.as_deref(), &source_dir, DirKind::Build)?;

    let name = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let [configure, make, install] =
        commands(state, &source_dir, &build_dir, &prefix, configure_args, prefix_flag);

    ctx.shell.status(Status::Configuring, &name);
    ctx.runner
        .run(&configure)
        .with_context(|| format!("configure of {} failed", name))?;

    ctx.shell.status(Status::Building, &name);
    ctx.runner
        .run(&make)
        .with_context(|| format!("build of {} failed", name))?;
    ctx.runner
        .run(&install)
        .with_context(|| format!("install of {} failed", name))?;

    Ok(prefix)
}
