//! Prefix and build directory allocation.
//!
//! A directory handed to a build is always freshly created. Reusing an
//! existing one would silently mix in stale artifacts, so allocation fails
//! instead. Default locations live inside the extracted source tree, which
//! must already exist.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::error::{BuildError, DirKind};

/// The directory an allocation would target, without touching the disk.
///
/// `explicit` wins when given; otherwise `<source_dir>/prefix` or
/// `<source_dir>/build`. Both are resolved against `base` when relative.
pub fn target_dir(base: &Path, explicit: Option<&Path>, source_dir: &Path, kind: DirKind) -> PathBuf {
    let source_dir = crate::util::fs::absolutize(base, source_dir);
    match explicit {
        Some(dir) => crate::util::fs::absolutize(base, dir),
        None => source_dir.join(kind.default_name()),
    }
}

/// Create a previously nonexistent directory for a build.
///
/// Only explicit targets get their parents created.
pub fn allocate_dir(
    base: &Path,
    explicit: Option<&Path>,
    source_dir: &Path,
    kind: DirKind,
) -> Result<PathBuf> {
    let dir = target_dir(base, explicit, source_dir, kind);

    if explicit.is_some() {
        if let Some(parent) = dir.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    } else {
        let source_dir = crate::util::fs::absolutize(base, source_dir);
        if !source_dir.is_dir() {
            return Err(BuildError::SourceDirMissing { path: source_dir }.into());
        }
    }

    match std::fs::create_dir(&dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(BuildError::DirectoryExists { kind, path: dir }.into());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("failed to create {} directory: {}", kind, dir.display())));
        }
    }

    tracing::debug!("allocated {} directory {}", kind, dir.display());
    Ok(dir)
}
