//! `depbuild init` command

use anyhow::Result;

use super::Session;
use crate::cli::InitArgs;
use depbuild::ops::{init, InitOptions};
use depbuild::util::shell::Status;

pub fn execute(session: &Session<'_>, args: InitArgs) -> Result<()> {
    let options = InitOptions {
        cc: args.cc,
        cxx: args.cxx,
    };

    let state = init(&session.state_path, &session.config, &options)?;

    session.shell.status(
        Status::Created,
        format!(
            "builder state for {} at {} (cc={}, cxx={})",
            state.platform,
            session.state_path.display(),
            state.compilers.cc,
            state.compilers.cxx
        ),
    );
    Ok(())
}
