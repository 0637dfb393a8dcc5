//! Build orchestration error types and diagnostics.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Which kind of directory the allocator was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    Prefix,
    Build,
}

impl DirKind {
    /// Name of the default subdirectory under a source tree.
    pub fn default_name(&self) -> &'static str {
        match self {
            DirKind::Prefix => "prefix",
            DirKind::Build => "build",
        }
    }
}

impl fmt::Display for DirKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirKind::Prefix => write!(f, "prefix"),
            DirKind::Build => write!(f, "build"),
        }
    }
}

/// Fatal errors raised by the orchestrator.
///
/// None of these are retried; they surface straight to the entry point.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("unknown platform `{0}`")]
    #[diagnostic(
        code(depbuild::platform::unsupported),
        help("supported platforms are Linux, macOS and Windows")
    )]
    UnsupportedPlatform(String),

    #[error("unknown archive type on URL {0}")]
    #[diagnostic(
        code(depbuild::fetch::archive_format),
        help("supported archives end in .tar.gz, .tar.bz2, .tar.xz or .zip")
    )]
    UnsupportedArchiveFormat(String),

    #[error("{kind} directory {} already exists", .path.display())]
    #[diagnostic(
        code(depbuild::dirs::exists),
        help("remove the stale directory or pass an explicit --prefix/--build-dir")
    )]
    DirectoryExists { kind: DirKind, path: PathBuf },

    #[error("source directory {} does not exist", .path.display())]
    #[diagnostic(
        code(depbuild::dirs::no_source),
        help("the archive did not unpack where expected; check the requested version")
    )]
    SourceDirMissing { path: PathBuf },

    #[error("{} while executing \"{command}\"", describe_exit(.code))]
    #[diagnostic(
        code(depbuild::process::failed),
        help("run again with --verbose to see every command line")
    )]
    CommandFailed { code: Option<i32>, command: String },

    #[error("build tools are not provisioned (missing {missing})")]
    #[diagnostic(
        code(depbuild::tools::missing),
        help("run `depbuild tool cmake` and `depbuild tool ninja` first")
    )]
    ToolsNotProvisioned { missing: String },

    #[error("prefix for `{0}` was already recorded in this run")]
    #[diagnostic(code(depbuild::state::duplicate))]
    PrefixAlreadyRecorded(String),

    #[error("invalid version `{version}` for `{library}`: expected major.minor.patch")]
    #[diagnostic(code(depbuild::recipe::version))]
    InvalidVersion { library: String, version: String },

    #[error("`{library}` cannot honour {option}")]
    #[diagnostic(code(depbuild::recipe::option))]
    UnsupportedOption { library: String, option: String },

    #[error("unknown library `{0}`")]
    #[diagnostic(
        code(depbuild::recipe::unknown),
        help("known libraries: yaml-cpp, sqlpp11, date, sqlpp11-mysql, catch2, boost, cyrus-sasl, qt5base")
    )]
    UnknownLibrary(String),

    #[error("failed to download {url}: HTTP {status}")]
    #[diagnostic(
        code(depbuild::fetch::http),
        help("check your network connection and the upstream URL")
    )]
    DownloadFailed { url: String, status: u16 },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Exit code {}", code),
        None => "Terminated by signal".to_string(),
    }
}

impl BuildError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_context(format!("code: {}", code));
        }

        match self {
            BuildError::DirectoryExists { path, .. } | BuildError::SourceDirMissing { path } => {
                diag = diag.with_location(path.clone());
            }
            _ => {}
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = BuildError::CommandFailed {
            code: Some(2),
            command: "make install".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Exit code 2 while executing \"make install\""
        );

        let killed = BuildError::CommandFailed {
            code: None,
            command: "ninja".to_string(),
        };
        assert!(killed.to_string().starts_with("Terminated by signal"));
    }

    #[test]
    fn test_directory_exists_diagnostic() {
        let err = BuildError::DirectoryExists {
            kind: DirKind::Prefix,
            path: PathBuf::from("/tmp/yaml-cpp/prefix"),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: prefix directory /tmp/yaml-cpp/prefix already exists"));
        assert!(output.contains("--> /tmp/yaml-cpp/prefix"));
        assert!(output.contains("depbuild::dirs::exists"));
        assert!(output.contains("help: remove the stale directory"));
    }

    #[test]
    fn test_source_dir_missing_diagnostic() {
        let err = BuildError::SourceDirMissing {
            path: PathBuf::from("/w/date-3.0.0"),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: source directory /w/date-3.0.0 does not exist"));
        assert!(output.contains("--> /w/date-3.0.0"));
        assert!(output.contains("help: the archive did not unpack"));
    }

    #[test]
    fn test_diagnostic_without_help() {
        let err = BuildError::PrefixAlreadyRecorded("boost".to_string());
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("`boost`"));
        assert!(!output.contains("help:"));
    }
}
