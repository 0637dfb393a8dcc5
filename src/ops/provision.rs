//! Build tool provisioning.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::core::state::OrchestratorState;
use crate::sources::archive::fetch_and_extract;
use crate::tools::Tool;
use crate::util::fs::make_executable;
use crate::util::shell::Status;

/// Download and unpack a tool release, then record its executable.
pub fn provision(
    ctx: &BuildContext<'_>,
    state: &mut OrchestratorState,
    tool: Tool,
    version: &str,
) -> Result<PathBuf> {
    let release = tool.release(state.platform, version);
    ctx.shell
        .status(Status::Provisioning, format!("{} v{}", tool.name(), version));

    fetch_and_extract(ctx, &release.url, release.label)
        .with_context(|| format!("failed to provision {} v{}", tool.name(), version))?;

    let executable = ctx.resolve(&release.executable);
    if executable.exists() {
        make_executable(&executable)?;
    } else {
        ctx.shell.warn(format!(
            "{} was not found at {} after extraction",
            tool.name(),
            executable.display()
        ));
    }

    match tool {
        Tool::CMake => state.tools.cmake = Some(executable.clone()),
        Tool::Ninja => state.tools.ninja = Some(executable.clone()),
    }

    ctx.shell.status(
        Status::Installed,
        format!("{} at {}", tool.name(), executable.display()),
    );
    Ok(executable)
}

/// Provision CMake and record its path.
pub fn provision_cmake(
    ctx: &BuildContext<'_>,
    state: &mut OrchestratorState,
    version: &str,
) -> Result<PathBuf> {
    provision(ctx, state, Tool::CMake, version)
}

/// Provision Ninja and record its path.
pub fn provision_ninja(
    ctx: &BuildContext<'_>,
    state: &mut OrchestratorState,
    version: &str,
) -> Result<PathBuf> {
    provision(ctx, state, Tool::Ninja, version)
}
