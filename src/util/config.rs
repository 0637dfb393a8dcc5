//! Configuration file support.
//!
//! An optional `depbuild.toml` in the working directory overrides the
//! built-in defaults:
//!
//! ```toml
//! [toolchain]
//! cc = "clang"
//! cxx = "clang++"
//!
//! [tools]
//! cmake = "3.21.1"
//! ninja = "1.10.2"
//!
//! [versions]
//! yaml-cpp = "0.6.3"
//! boost = "1.76.0"
//! ```
//!
//! Precedence for compilers: CLI flag > config file > `CC`/`CXX` > gcc/g++.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::state::Compilers;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "depbuild.toml";

/// Orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compiler overrides
    pub toolchain: ToolchainSettings,

    /// Pinned build tool versions
    pub tools: ToolVersions,

    /// Library version overrides keyed by library name
    pub versions: BTreeMap<String, String>,
}

/// Compiler overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler (e.g. `clang` or `/usr/bin/gcc-11`)
    pub cc: Option<String>,

    /// C++ compiler
    pub cxx: Option<String>,
}

/// Tool version overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolVersions {
    pub cmake: Option<String>,
    pub ninja: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if the file doesn't exist.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Version override for a library, if configured.
    pub fn version_for(&self, library: &str) -> Option<&str> {
        self.versions.get(library).map(String::as_str)
    }

    /// Resolve compilers: explicit flags, then this config, then `env`.
    pub fn compilers(&self, cc: Option<String>, cxx: Option<String>, env: Compilers) -> Compilers {
        Compilers {
            cc: cc
                .or_else(|| self.toolchain.cc.clone())
                .unwrap_or(env.cc),
            cxx: cxx
                .or_else(|| self.toolchain.cxx.clone())
                .unwrap_or(env.cxx),
        }
    }
}

/// Path of the configuration file inside a working directory.
pub fn config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [toolchain]
            cc = "clang"

            [tools]
            ninja = "1.11.1"

            [versions]
            yaml-cpp = "0.7.0"
            "#,
        )
        .unwrap();

        assert_eq!(config.toolchain.cc.as_deref(), Some("clang"));
        assert!(config.toolchain.cxx.is_none());
        assert_eq!(config.tools.ninja.as_deref(), Some("1.11.1"));
        assert!(config.tools.cmake.is_none());
        assert_eq!(config.version_for("yaml-cpp"), Some("0.7.0"));
        assert_eq!(config.version_for("boost"), None);
    }

    #[test]
    fn test_compiler_precedence() {
        let config = Config {
            toolchain: ToolchainSettings {
                cc: Some("clang".to_string()),
                cxx: None,
            },
            ..Config::default()
        };
        let env = Compilers::new("cc-from-env", "cxx-from-env");

        let resolved = config.compilers(None, None, env.clone());
        assert_eq!(resolved, Compilers::new("clang", "cxx-from-env"));

        let resolved = config.compilers(Some("gcc-12".to_string()), None, env);
        assert_eq!(resolved.cc, "gcc-12");
    }

    #[test]
    fn test_load_or_default() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        std::fs::write(&path, "[versions]\nboost = \"1.77.0\"\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.version_for("boost"), Some("1.77.0"));

        std::fs::write(&path, "versions = 3").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }
}
