//! Build context - working directory and the external-effect seams.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::sources::download::Downloader;
use crate::util::process::CommandRunner;
use crate::util::shell::Shell;

/// Where a run happens and how it reaches the outside world.
///
/// Archives are downloaded and extracted into `work_dir`; relative source
/// directories of recipes are resolved against it.
pub struct BuildContext<'a> {
    /// Absolute working directory
    pub work_dir: PathBuf,

    /// Executes every external command
    pub runner: &'a dyn CommandRunner,

    /// Fetches archives
    pub downloader: &'a dyn Downloader,

    /// User-facing output
    pub shell: &'a Shell,
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl<'a> BuildContext<'a> {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        runner: &'a dyn CommandRunner,
        downloader: &'a dyn Downloader,
        shell: &'a Shell,
    ) -> Self {
        BuildContext {
            work_dir: work_dir.into(),
            runner,
            downloader,
            shell,
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::util::fs::absolutize(&self.work_dir, path)
    }
}
