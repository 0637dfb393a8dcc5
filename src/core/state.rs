//! Orchestrator state: compilers, tool paths and installed prefixes.
//!
//! The state is created once (`depbuild init`), mutated additively by each
//! step and written back to disk so that later invocations can reuse the
//! prefixes computed earlier.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::error::BuildError;
use crate::core::platform::Platform;

/// Default file name of the persisted state.
pub const DEFAULT_STATE_FILE: &str = "builder.toml";

/// Default C compiler when `CC` is unset.
pub const DEFAULT_CC: &str = "gcc";

/// Default C++ compiler when `CXX` is unset.
pub const DEFAULT_CXX: &str = "g++";

/// C and C++ compiler selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compilers {
    pub cc: String,
    pub cxx: String,
}

impl Compilers {
    pub fn new(cc: impl Into<String>, cxx: impl Into<String>) -> Self {
        Compilers {
            cc: cc.into(),
            cxx: cxx.into(),
        }
    }

    /// Resolve compilers from `CC`/`CXX`, falling back to gcc/g++.
    ///
    /// This is the only place the process environment is consulted.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Compilers {
            cc: lookup("CC")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_CC.to_string()),
            cxx: lookup("CXX")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_CXX.to_string()),
        }
    }

    /// Boost toolset name: the file name of the C compiler.
    pub fn toolset(&self) -> String {
        Path::new(&self.cc)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.cc.clone())
    }
}

impl Default for Compilers {
    fn default() -> Self {
        Compilers::new(DEFAULT_CC, DEFAULT_CXX)
    }
}

/// Resolved build tool executables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ninja: Option<PathBuf>,
}

impl ToolPaths {
    /// Both tools have been provisioned.
    pub fn is_provisioned(&self) -> bool {
        self.cmake.is_some() && self.ninja.is_some()
    }

    /// Fail unless every tool is known.
    pub fn ensure_provisioned(&self) -> Result<(), BuildError> {
        let missing: Vec<&str> = [("cmake", &self.cmake), ("ninja", &self.ninja)]
            .into_iter()
            .filter(|(_, path)| path.is_none())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BuildError::ToolsNotProvisioned {
                missing: missing.join(", "),
            })
        }
    }

    /// The CMake executable, if provisioned.
    pub fn cmake(&self) -> Result<&Path, BuildError> {
        self.cmake
            .as_deref()
            .ok_or_else(|| BuildError::ToolsNotProvisioned {
                missing: "cmake".to_string(),
            })
    }

    /// The Ninja executable, if provisioned.
    pub fn ninja(&self) -> Result<&Path, BuildError> {
        self.ninja
            .as_deref()
            .ok_or_else(|| BuildError::ToolsNotProvisioned {
                missing: "ninja".to_string(),
            })
    }
}

/// Installed prefix per library key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryPrefixes {
    entries: BTreeMap<String, PathBuf>,
    /// Keys recorded by this process; never persisted.
    #[serde(skip)]
    recorded: BTreeSet<String>,
}

impl LibraryPrefixes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix of a library, or an empty path when it was never built.
    pub fn lookup(&self, library: &str) -> &Path {
        self.entries
            .get(library)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Whether the library has a recorded prefix.
    pub fn contains(&self, library: &str) -> bool {
        self.entries.contains_key(library)
    }

    /// Whether the library was recorded by this process.
    pub fn recorded_this_run(&self, library: &str) -> bool {
        self.recorded.contains(library)
    }

    /// Record a freshly installed prefix.
    ///
    /// An entry loaded from a previous run may be replaced; an entry
    /// recorded by this process may not.
    pub fn record(&mut self, library: &str, prefix: PathBuf) -> Result<(), BuildError> {
        if !self.recorded.insert(library.to_string()) {
            return Err(BuildError::PrefixAlreadyRecorded(library.to_string()));
        }
        if let Some(previous) = self.entries.insert(library.to_string(), prefix) {
            tracing::debug!("replacing prefix of `{}` from a previous run ({})", library, previous.display());
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for LibraryPrefixes {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Everything a run needs to carry between steps and invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorState {
    pub platform: Platform,
    pub compilers: Compilers,
    #[serde(default)]
    pub tools: ToolPaths,
    #[serde(default)]
    pub prefixes: LibraryPrefixes,
}

impl OrchestratorState {
    /// A fresh, unprovisioned state.
    pub fn new(platform: Platform, compilers: Compilers) -> Self {
        OrchestratorState {
            platform,
            compilers,
            tools: ToolPaths::default(),
            prefixes: LibraryPrefixes::new(),
        }
    }

    /// Load a state previously written by [`OrchestratorState::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read builder state: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse builder state: {}", path.display()))
    }

    /// Persist the state, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize builder state")?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(contents.as_bytes())
            .with_context(|| "failed to write builder state")?;
        tmp.persist(path)
            .with_context(|| format!("failed to write builder state: {}", path.display()))?;

        tracing::debug!("saved builder state to {}", path.display());
        Ok(())
    }
}
