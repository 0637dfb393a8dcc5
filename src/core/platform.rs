//! Host platform detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::BuildError;

/// The closed set of platforms the orchestrator knows how to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    #[serde(rename = "macOS")]
    MacOs,
    Windows,
}

impl Platform {
    /// Map a host identifier to a platform.
    ///
    /// Accepts both the classic `sys.platform`-style spellings (`linux2`,
    /// `darwin`, `win32`) and Rust's `std::env::consts::OS` values.
    pub fn from_host_id(id: &str) -> Result<Self, BuildError> {
        match id {
            "linux" | "linux1" | "linux2" => Ok(Platform::Linux),
            "darwin" | "macos" => Ok(Platform::MacOs),
            "win32" | "windows" => Ok(Platform::Windows),
            other => Err(BuildError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Detect the platform of the running process.
    pub fn detect() -> Result<Self, BuildError> {
        Self::from_host_id(std::env::consts::OS)
    }

    /// Display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
        }
    }

    /// The make tool used by configure-based builds.
    pub const fn make_program(&self) -> &'static str {
        match self {
            Platform::Windows => "nmake",
            Platform::Linux | Platform::MacOs => "make",
        }
    }

    /// Suffix appended to executable names.
    pub const fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Linux | Platform::MacOs => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
