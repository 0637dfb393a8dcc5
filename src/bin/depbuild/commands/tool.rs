//! `depbuild tool` command

use anyhow::Result;

use super::Session;
use crate::cli::ToolArgs;
use depbuild::ops::provision;
use depbuild::tools::Tool;

pub fn execute(session: &Session<'_>, args: ToolArgs) -> Result<()> {
    let tool = Tool::from(args.tool);
    let configured = match tool {
        Tool::CMake => session.config.tools.cmake.as_deref(),
        Tool::Ninja => session.config.tools.ninja.as_deref(),
    };
    let version = args
        .version
        .as_deref()
        .or(configured)
        .unwrap_or_else(|| tool.default_version());

    let mut state = session.load_state()?;
    session.with_build_context(|ctx| provision(ctx, &mut state, tool, version))?;
    session.save_state(&state)
}
