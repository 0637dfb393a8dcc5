//! Command implementations

pub mod all;
pub mod completions;
pub mod doctor;
pub mod init;
pub mod lib;
pub mod show;
pub mod tool;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use depbuild::builder::BuildContext;
use depbuild::core::state::OrchestratorState;
use depbuild::sources::HttpDownloader;
use depbuild::util::config::{config_path, Config};
use depbuild::util::fs::absolutize;
use depbuild::util::process::SystemRunner;
use depbuild::util::Shell;

/// The state file has not been created yet.
#[derive(Debug, thiserror::Error)]
#[error("no builder state at {}", .0.display())]
pub struct MissingState(pub PathBuf);

/// Resolved global options shared by every command.
pub struct Session<'a> {
    /// Absolute working directory; archives and sources land here
    pub work_dir: PathBuf,
    pub state_path: PathBuf,
    pub config: Config,
    pub shell: &'a Shell,
}

impl<'a> Session<'a> {
    pub fn new(work_dir: Option<&Path>, state: &Path, shell: &'a Shell) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let work_dir = match work_dir {
            Some(dir) => absolutize(&cwd, dir),
            None => cwd,
        };
        if !work_dir.is_dir() {
            bail!("working directory {} does not exist", work_dir.display());
        }

        let state_path = absolutize(&work_dir, state);
        let config = Config::load_or_default(&config_path(&work_dir))?;

        Ok(Session {
            work_dir,
            state_path,
            config,
            shell,
        })
    }

    pub fn load_state(&self) -> Result<OrchestratorState> {
        if !self.state_path.exists() {
            return Err(MissingState(self.state_path.clone()).into());
        }
        OrchestratorState::load(&self.state_path)
    }

    pub fn save_state(&self, state: &OrchestratorState) -> Result<()> {
        state.save(&self.state_path)
    }

    /// Run `f` with the real command runner and HTTP downloader.
    pub fn with_build_context<T>(&self, f: impl FnOnce(&BuildContext<'_>) -> Result<T>) -> Result<T> {
        let runner = SystemRunner;
        let downloader = HttpDownloader::new()?;
        let ctx = BuildContext::new(self.work_dir.clone(), &runner, &downloader, self.shell);
        f(&ctx)
    }
}
