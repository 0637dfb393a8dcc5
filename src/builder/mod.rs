//! Build drivers.
//!
//! Each driver allocates fresh prefix/build directories for a source tree
//! and runs a configure/build/install sequence through the
//! [`CommandRunner`](crate::util::process::CommandRunner) seam.

pub mod cmake;
pub mod context;
pub mod dirs;
pub mod make;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use context::BuildContext;
pub use make::PrefixFlag;

/// CMake build configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildVariant {
    #[default]
    Release,
    Debug,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildVariant {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Release => "Release",
            BuildVariant::Debug => "Debug",
            BuildVariant::RelWithDebInfo => "RelWithDebInfo",
            BuildVariant::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(BuildVariant::Release),
            "debug" => Ok(BuildVariant::Debug),
            "relwithdebinfo" => Ok(BuildVariant::RelWithDebInfo),
            "minsizerel" => Ok(BuildVariant::MinSizeRel),
            _ => Err(format!(
                "invalid build type `{}`, expected one of: Release, Debug, RelWithDebInfo, MinSizeRel",
                s
            )),
        }
    }
}

/// One driver invocation over an extracted source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Source tree, relative to the working directory or absolute
    pub source_dir: PathBuf,

    /// Installation prefix; `<source_dir>/prefix` when unset
    pub prefix_dir: Option<PathBuf>,

    /// Scratch directory; `<source_dir>/build` when unset
    pub build_dir: Option<PathBuf>,

    pub variant: BuildVariant,
}

impl BuildRequest {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        BuildRequest {
            source_dir: source_dir.into(),
            prefix_dir: None,
            build_dir: None,
            variant: BuildVariant::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parse() {
        assert_eq!("Release".parse::<BuildVariant>().unwrap(), BuildVariant::Release);
        assert_eq!("debug".parse::<BuildVariant>().unwrap(), BuildVariant::Debug);
        assert_eq!(
            "RELWITHDEBINFO".parse::<BuildVariant>().unwrap(),
            BuildVariant::RelWithDebInfo
        );
        assert!("fast".parse::<BuildVariant>().is_err());
        assert_eq!(BuildVariant::MinSizeRel.to_string(), "MinSizeRel");
    }

    #[test]
    fn test_request_defaults() {
        let request = BuildRequest::new("boost_1_76_0");
        assert_eq!(request.variant, BuildVariant::Release);
        assert!(request.prefix_dir.is_none());
        assert!(request.build_dir.is_none());
    }
}
