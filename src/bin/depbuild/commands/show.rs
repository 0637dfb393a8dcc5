//! `depbuild show` command

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use super::Session;
use crate::cli::ShowArgs;
use depbuild::core::state::OrchestratorState;
use depbuild::util::diagnostic::{emit, Diagnostic};

pub fn execute(session: &Session<'_>, args: ShowArgs) -> Result<()> {
    let state = session.load_state()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    print!("{}", render(&state));

    if let Err(e) = state.tools.ensure_provisioned() {
        if !session.shell.is_quiet() {
            let diag = Diagnostic::warning(e.to_string())
                .with_location(session.state_path.clone())
                .with_suggestion("run `depbuild tool cmake` and `depbuild tool ninja`");
            emit(&diag, session.shell.use_color());
        }
    }

    Ok(())
}

fn render(state: &OrchestratorState) -> String {
    let mut out = String::new();
    let tool = |path: Option<&Path>| match path {
        Some(path) => path.display().to_string(),
        None => "(not provisioned)".to_string(),
    };

    let _ = writeln!(out, "platform: {}", state.platform);
    let _ = writeln!(out, "cc:       {}", state.compilers.cc);
    let _ = writeln!(out, "cxx:      {}", state.compilers.cxx);
    let _ = writeln!(out, "cmake:    {}", tool(state.tools.cmake.as_deref()));
    let _ = writeln!(out, "ninja:    {}", tool(state.tools.ninja.as_deref()));

    if state.prefixes.is_empty() {
        let _ = writeln!(out, "libraries: none built");
    } else {
        let _ = writeln!(out, "libraries:");
        let width = state.prefixes.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, prefix) in state.prefixes.iter() {
            let _ = writeln!(out, "  {:<width$}  {}", key, prefix.display(), width = width);
        }
    }

    out
}
