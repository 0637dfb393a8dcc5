//! Test utilities and mocks for depbuild unit tests.
//!
//! Provides a [`RecordingRunner`] standing in for real child processes, a
//! [`StaticDownloader`] standing in for the network, and [`TestEnv`] tying
//! them to a scratch working directory.
//!
//! # Example
//!
//! ```rust,ignore
//! let env = TestEnv::new();
//! let ctx = env.context();
//! fetch_and_extract(&ctx, "https://example.com/a.tar.gz", "a")?;
//! assert_eq!(env.runner.commands().len(), 1);
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::core::platform::Platform;
use crate::core::state::{Compilers, OrchestratorState};
use crate::recipes::{DependencyPrefixes, Library};
use crate::sources::download::Downloader;
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::shell::Shell;

/// Records every command instead of running it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<ProcessBuilder>>,
    failures: RefCell<Vec<(String, i32)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any command whose display form contains `pattern` exit with `code`.
    pub fn fail_on(&self, pattern: &str, code: i32) -> &Self {
        self.failures.borrow_mut().push((pattern.to_string(), code));
        self
    }

    /// Display form of every command run so far.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Every command run so far.
    pub fn invocations(&self) -> Vec<ProcessBuilder> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        self.calls.borrow_mut().push(cmd.clone());

        let display = cmd.display_command();
        let failure = self
            .failures
            .borrow()
            .iter()
            .find(|(pattern, _)| display.contains(pattern.as_str()))
            .map(|(_, code)| *code);

        match failure {
            Some(code) => Err(BuildError::CommandFailed {
                code: Some(code),
                command: display,
            }
            .into()),
            None => Ok(()),
        }
    }
}

/// Writes a fixed body for every URL and records what was requested.
#[derive(Debug)]
pub struct StaticDownloader {
    body: Vec<u8>,
    status: Option<u16>,
    requested: RefCell<Vec<String>>,
}

impl StaticDownloader {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        StaticDownloader {
            body: body.into(),
            status: None,
            requested: RefCell::new(Vec::new()),
        }
    }

    /// Answer every request with an HTTP error status.
    pub fn failing(status: u16) -> Self {
        StaticDownloader {
            status: Some(status),
            ..StaticDownloader::new(Vec::new())
        }
    }

    /// URLs requested so far.
    pub fn urls(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Default for StaticDownloader {
    fn default() -> Self {
        StaticDownloader::new(b"archive".to_vec())
    }
}

impl Downloader for StaticDownloader {
    fn download(&self, url: &str, dest: &Path, _shell: &Shell) -> Result<u64> {
        self.requested.borrow_mut().push(url.to_string());

        if let Some(status) = self.status {
            return Err(BuildError::DownloadFailed {
                url: url.to_string(),
                status,
            }
            .into());
        }

        std::fs::write(dest, &self.body)?;
        Ok(self.body.len() as u64)
    }
}

/// A scratch working directory with mock runner and downloader.
pub struct TestEnv {
    pub dir: TempDir,
    pub runner: RecordingRunner,
    pub downloader: StaticDownloader,
    pub shell: Shell,
}

impl TestEnv {
    pub fn new() -> Self {
        TestEnv {
            dir: TempDir::new().expect("failed to create temp dir"),
            runner: RecordingRunner::new(),
            downloader: StaticDownloader::default(),
            shell: Shell::quiet(),
        }
    }

    /// Use a different downloader.
    pub fn with_downloader(mut self, downloader: StaticDownloader) -> Self {
        self.downloader = downloader;
        self
    }

    /// Absolute working directory.
    pub fn work_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Lay out `source_dir` as if its archive had just been extracted.
    pub fn unpack(&self, source_dir: &str) -> PathBuf {
        let dir = self.dir.path().join(source_dir);
        std::fs::create_dir_all(&dir).expect("failed to create source dir");
        dir
    }

    /// Unpack the default source tree of every library, Boost scripts included.
    pub fn unpack_all(&self) {
        for library in Library::ALL {
            let plan = library
                .plan(library.default_version(), &DependencyPrefixes::new())
                .expect("default versions are valid");
            let dir = self.dir.path().join(&plan.source_dir);
            std::fs::create_dir_all(&dir).expect("failed to create source dir");
            if library == Library::Boost {
                for script in ["bootstrap.sh", "tools/build/src/engine/build.sh"] {
                    crate::util::fs::write_string(&dir.join(script), "#!/bin/sh\n")
                        .expect("failed to write boost script");
                }
            }
        }
    }

    /// A build context over this environment.
    pub fn context(&self) -> BuildContext<'_> {
        BuildContext::new(self.work_dir(), &self.runner, &self.downloader, &self.shell)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A Linux gcc state with both tools provisioned under `root`.
pub fn provisioned_state(root: &Path) -> OrchestratorState {
    let mut state = OrchestratorState::new(Platform::Linux, Compilers::default());
    state.tools.cmake = Some(root.join("cmake-3.21.1-linux-x86_64/bin/cmake"));
    state.tools.ninja = Some(root.join("ninja"));
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner() {
        let runner = RecordingRunner::new();
        runner.fail_on("install", 2);

        runner.run(&ProcessBuilder::new("make")).unwrap();
        let err = runner
            .run(&ProcessBuilder::new("make").arg("install"))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::CommandFailed { code: Some(2), .. })
        ));
        assert_eq!(runner.commands(), vec!["make", "make install"]);
    }

    #[test]
    fn test_unpack_all_lays_out_sources() {
        let env = TestEnv::new();
        env.unpack_all();

        assert!(env.work_dir().join("yaml-cpp-yaml-cpp-0.6.3").is_dir());
        assert!(env.work_dir().join("qtbase-everywhere-src-5.15.2").is_dir());
        assert!(env.work_dir().join("boost_1_76_0/bootstrap.sh").is_file());
    }

    #[test]
    fn test_static_downloader() {
        let env = TestEnv::new();
        let dest = env.work_dir().join("x.tar.gz");
        let n = env
            .downloader
            .download("https://example.com/x.tar.gz", &dest, &env.shell)
            .unwrap();

        assert_eq!(n, 7);
        assert_eq!(std::fs::read(&dest).unwrap(), b"archive");

        let failing = StaticDownloader::failing(404);
        assert!(failing.download("https://example.com/x", &dest, &env.shell).is_err());
        assert_eq!(failing.urls().len(), 1);
    }
}
