//! `depbuild all` command
//!
//! Starts from a fresh state, like `init`, and saves after every step.

use anyhow::Result;

use super::Session;
use depbuild::core::platform::Platform;
use depbuild::core::state::Compilers;
use depbuild::ops::{build_all, fresh_state, InitOptions};

pub fn execute(session: &Session<'_>) -> Result<()> {
    let platform = Platform::detect()?;
    let mut state = fresh_state(
        platform,
        &session.config,
        &InitOptions::default(),
        Compilers::from_env(),
    );
    session.save_state(&state)?;

    session.with_build_context(|ctx| {
        build_all(ctx, &mut state, &session.config, |s| session.save_state(s))
    })?;

    session
        .shell
        .note(format!("prefixes recorded in {}", session.state_path.display()));
    Ok(())
}
