//! Pinned CMake and Ninja releases.
//!
//! Only the download location and the path of the executable inside the
//! extracted tree are described here; `ops::provision` does the fetching.

use std::path::PathBuf;

use crate::core::platform::Platform;

/// Default CMake release.
pub const CMAKE_VERSION: &str = "3.21.1";

/// Default Ninja release.
pub const NINJA_VERSION: &str = "1.10.2";

/// Which build tool a release provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CMake,
    Ninja,
}

impl Tool {
    pub const fn name(&self) -> &'static str {
        match self {
            Tool::CMake => "cmake",
            Tool::Ninja => "ninja",
        }
    }

    pub const fn default_version(&self) -> &'static str {
        match self {
            Tool::CMake => CMAKE_VERSION,
            Tool::Ninja => NINJA_VERSION,
        }
    }

    /// Release description for a platform.
    pub fn release(&self, platform: Platform, version: &str) -> ToolRelease {
        match self {
            Tool::CMake => cmake_release(platform, version),
            Tool::Ninja => ninja_release(platform, version),
        }
    }
}

/// Where to download a tool and where its executable lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRelease {
    pub tool: Tool,
    pub version: String,
    pub url: String,
    /// Archive label, also the local archive file stem
    pub label: &'static str,
    /// Executable path relative to the working directory after extraction
    pub executable: PathBuf,
}

/// The official CMake binary release.
pub fn cmake_release(platform: Platform, version: &str) -> ToolRelease {
    let (suffix, dir, exe): (&str, String, &[&str]) = match platform {
        Platform::Linux => (
            "Linux-x86_64.tar.gz",
            format!("cmake-{}-linux-x86_64", version),
            &["bin", "cmake"],
        ),
        Platform::MacOs => (
            "Darwin-x86_64.tar.gz",
            format!("cmake-{}-Darwin-x86_64", version),
            &["CMake.app", "Contents", "bin", "cmake"],
        ),
        Platform::Windows => (
            "win64-x64.zip",
            format!("cmake-{}-win64-x64", version),
            &["bin", "cmake.exe"],
        ),
    };

    let mut executable = PathBuf::from(dir);
    executable.extend(exe);

    ToolRelease {
        tool: Tool::CMake,
        version: version.to_string(),
        url: format!(
            "https://github.com/Kitware/CMake/releases/download/v{v}/cmake-{v}-{suffix}",
            v = version,
            suffix = suffix
        ),
        label: "cmake",
        executable,
    }
}

/// The official Ninja binary release.
pub fn ninja_release(platform: Platform, version: &str) -> ToolRelease {
    let suffix = match platform {
        Platform::Linux => "linux",
        Platform::MacOs => "mac",
        Platform::Windows => "win",
    };

    ToolRelease {
        tool: Tool::Ninja,
        version: version.to_string(),
        url: format!(
            "https://github.com/ninja-build/ninja/releases/download/v{}/ninja-{}.zip",
            version, suffix
        ),
        label: "ninja",
        executable: PathBuf::from(format!("ninja{}", platform.exe_suffix())),
    }
}
