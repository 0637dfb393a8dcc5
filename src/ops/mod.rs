//! High-level operations.
//!
//! This module contains the implementation of depbuild commands.

pub mod build;
pub mod doctor;
pub mod init;
pub mod provision;

pub use build::{build_all, build_library, plan_library, LibraryOptions};
pub use doctor::{doctor, format_report, DoctorOptions, DoctorReport};
pub use init::{fresh_state, init, InitOptions};
pub use provision::{provision, provision_cmake, provision_ninja};
