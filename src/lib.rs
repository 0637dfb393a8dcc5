//! depbuild - downloads, builds and installs a fixed set of native libraries
//!
//! This crate provides the library behind the `depbuild` binary: recipes,
//! build drivers, tool provisioning and the persisted builder state.

pub mod builder;
pub mod core;
pub mod ops;
pub mod recipes;
pub mod sources;
pub mod tools;
pub mod util;

/// Test utilities and mocks for depbuild unit tests.
///
/// Only compiled for tests. Provides a recording command runner and a
/// static downloader so drivers run without touching the network or
/// spawning build tools.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{BuildError, OrchestratorState, Platform};
pub use recipes::Library;
