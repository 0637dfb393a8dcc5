//! Boost's bootstrap + b2 build.
//!
//! Boost does not use CMake or autoconf: `bootstrap` builds the `b2`
//! engine in-tree, and `b2` then builds and installs everything with the
//! source tree as its working directory. Only a prefix is allocated.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::context::BuildContext;
use crate::builder::dirs::allocate_dir;
use crate::builder::BuildRequest;
use crate::core::error::DirKind;
use crate::core::platform::Platform;
use crate::core::state::{Compilers, OrchestratorState};
use crate::util::fs::{make_executable, write_string};
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;

/// File name of the generated b2 user configuration.
pub const USER_CONFIG: &str = "user-config.jam";

/// Scripts that must be executable before bootstrapping on Unix hosts.
const UNIX_SCRIPTS: [&str; 2] = ["bootstrap.sh", "tools/build/src/engine/build.sh"];

/// Parameters of a b2 build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostBuild {
    pub variant: &'static str,
    pub link: &'static str,
    pub threading: &'static str,
    pub without_libraries: Vec<&'static str>,
}

impl Default for BoostBuild {
    fn default() -> Self {
        BoostBuild {
            variant: "release",
            link: "shared",
            threading: "multi",
            without_libraries: vec!["python"],
        }
    }
}

impl BoostBuild {
    /// Contents of `user-config.jam`.
    pub fn user_config(compilers: &Compilers) -> String {
        format!("using {} : : {} : ;\n", compilers.toolset(), compilers.cxx)
    }

    /// The bootstrap script and b2 binary names for a platform.
    pub const fn scripts(platform: Platform) -> (&'static str, &'static str) {
        match platform {
            Platform::Windows => ("bootstrap.bat", "b2.exe"),
            Platform::Linux | Platform::MacOs => ("bootstrap.sh", "b2"),
        }
    }

    /// The bootstrap and install commands, both run inside `source_dir`.
    pub fn commands(
        &self,
        state: &OrchestratorState,
        source_dir: &Path,
        prefix: &Path,
    ) -> [ProcessBuilder; 2] {
        let toolset = state.compilers.toolset();
        let (bootstrap, b2) = Self::scripts(state.platform);

        let mut bootstrap = ProcessBuilder::new(source_dir.join(bootstrap))
            .arg(format!("--with-toolset={}", toolset));
        for lib in &self.without_libraries {
            bootstrap = bootstrap.arg(format!("--without-libraries={}", lib));
        }

        let install = ProcessBuilder::new(source_dir.join(b2))
            .arg("--ignore-site-config")
            .arg(format!("--user-config=./{}", USER_CONFIG))
            .arg(format!("--prefix={}", prefix.display()))
            .arg(format!("toolset={}", toolset))
            .arg(format!("variant={}", self.variant))
            .arg(format!("link={}", self.link))
            .arg(format!("threading={}", self.threading))
            .arg("install");

        [bootstrap.cwd(source_dir), install.cwd(source_dir)]
    }
}

/// Bootstrap, build and install Boost, returning its prefix.
pub fn build(
    ctx: &BuildContext<'_>,
    state: &OrchestratorState,
    request: &BuildRequest,
    boost: &BoostBuild,
) -> Result<PathBuf> {
    state.tools.ensure_provisioned()?;

    let source_dir = ctx.resolve(&request.source_dir);
    let prefix = allocate_dir(&ctx.work_dir, request.prefix_dir.as_deref(), &source_dir, DirKind::Prefix)?;

    if state.platform != Platform::Windows {
        for script in UNIX_SCRIPTS {
            make_executable(&source_dir.join(script))?;
        }
    }

    write_string(&source_dir.join(USER_CONFIG), &BoostBuild::user_config(&state.compilers))?;

    let [bootstrap, install] = boost.commands(state, &source_dir, &prefix);

    ctx.shell.status(Status::Configuring, "boost (bootstrap)");
    ctx.runner
        .run(&bootstrap)
        .context("Boost bootstrap failed")?;

    ctx.shell.status(Status::Building, "boost (b2)");
    ctx.runner.run(&install).context("b2 install failed")?;

    Ok(prefix)
}
