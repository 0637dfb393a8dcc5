//! `depbuild lib` command

use anyhow::Result;

use super::Session;
use crate::cli::LibArgs;
use depbuild::ops::{build_library, LibraryOptions};
use depbuild::recipes::Library;

pub fn execute(session: &Session<'_>, args: LibArgs) -> Result<()> {
    let library: Library = args.library.parse()?;

    let options = LibraryOptions {
        version: args
            .version
            .or_else(|| session.config.version_for(library.key()).map(str::to_string)),
        prefix_dir: args.prefix,
        build_dir: args.build_dir,
        variant: args.build_type,
    };

    let mut state = session.load_state()?;
    session.with_build_context(|ctx| build_library(ctx, &mut state, library, &options))?;
    session.save_state(&state)
}
