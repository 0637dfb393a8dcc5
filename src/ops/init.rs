//! `depbuild init`: create a fresh builder state.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::platform::Platform;
use crate::core::state::{Compilers, OrchestratorState};
use crate::util::config::Config;

/// Compiler overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub cc: Option<String>,
    pub cxx: Option<String>,
}

/// A fresh, unprovisioned state for this host.
///
/// `env` supplies the `CC`/`CXX` fallback, below both the command line and
/// the configuration file.
pub fn fresh_state(
    platform: Platform,
    config: &Config,
    options: &InitOptions,
    env: Compilers,
) -> OrchestratorState {
    let compilers = config.compilers(options.cc.clone(), options.cxx.clone(), env);
    tracing::debug!("using compilers cc={} cxx={}", compilers.cc, compilers.cxx);
    OrchestratorState::new(platform, compilers)
}

/// Detect the host, resolve compilers and write a new state file.
///
/// An existing state file is replaced.
pub fn init(state_path: &Path, config: &Config, options: &InitOptions) -> Result<OrchestratorState> {
    let platform = Platform::detect().context("cannot initialize builder state")?;
    let state = fresh_state(platform, config, options, Compilers::from_env());
    state.save(state_path)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::ToolchainSettings;
    use tempfile::TempDir;

    #[test]
    fn test_compiler_precedence() {
        let env = Compilers::new("env-cc", "env-cxx");
        let config = Config {
            toolchain: ToolchainSettings {
                cc: Some("clang".to_string()),
                cxx: None,
            },
            ..Config::default()
        };

        let state = fresh_state(Platform::Linux, &config, &InitOptions::default(), env.clone());
        assert_eq!(state.compilers, Compilers::new("clang", "env-cxx"));

        let options = InitOptions {
            cc: Some("gcc-11".to_string()),
            cxx: Some("g++-11".to_string()),
        };
        let state = fresh_state(Platform::Linux, &config, &options, env);
        assert_eq!(state.compilers, Compilers::new("gcc-11", "g++-11"));
        assert!(!state.tools.is_provisioned());
        assert!(state.prefixes.is_empty());
    }

    #[test]
    fn test_init_writes_state() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("builder.toml");
        let options = InitOptions {
            cc: Some("cc".to_string()),
            cxx: Some("c++".to_string()),
        };

        let state = init(&path, &Config::default(), &options).unwrap();
        let loaded = OrchestratorState::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.compilers, Compilers::new("cc", "c++"));
    }
}
