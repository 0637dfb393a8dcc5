//! Core data structures: platform, persisted state and errors.

pub mod error;
pub mod platform;
pub mod state;

pub use error::{BuildError, DirKind};
pub use platform::Platform;
pub use state::{Compilers, LibraryPrefixes, OrchestratorState, ToolPaths};
