//! Archive download and extraction.
//!
//! The archive kind is decided purely from the URL's trailing extension;
//! extraction is delegated to the system `tar` and `7z` tools.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::builder::context::BuildContext;
use crate::core::error::BuildError;
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarBz2,
    TarXz,
    Zip,
}

impl ArchiveKind {
    const ALL: [ArchiveKind; 4] = [
        ArchiveKind::TarGz,
        ArchiveKind::TarBz2,
        ArchiveKind::TarXz,
        ArchiveKind::Zip,
    ];

    /// Determine the archive kind from a URL.
    ///
    /// Only the URL path is considered, so query strings and fragments do
    /// not hide the extension.
    pub fn from_url(url: &str) -> Result<Self, BuildError> {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.to_string(),
        };

        Self::ALL
            .into_iter()
            .find(|kind| path.ends_with(kind.extension()))
            .ok_or_else(|| BuildError::UnsupportedArchiveFormat(url.to_string()))
    }

    /// File extension including the leading dot.
    pub const fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::TarGz => ".tar.gz",
            ArchiveKind::TarBz2 => ".tar.bz2",
            ArchiveKind::TarXz => ".tar.xz",
            ArchiveKind::Zip => ".zip",
        }
    }

    /// Name of the system tool that unpacks this kind.
    pub const fn extractor(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "7z",
            ArchiveKind::TarGz | ArchiveKind::TarBz2 | ArchiveKind::TarXz => "tar",
        }
    }

    /// Command extracting `archive` into `dest`.
    pub fn extract_command(&self, archive: &Path, dest: &Path) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(self.extractor()).cwd(dest);
        match self {
            ArchiveKind::Zip => cmd.args(["x", "-y"]).arg(archive),
            ArchiveKind::TarGz | ArchiveKind::TarBz2 | ArchiveKind::TarXz => {
                cmd.arg("-xf").arg(archive)
            }
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension().trim_start_matches('.'))
    }
}

/// Local file name of a downloaded archive: `<label><ext>`.
pub fn archive_file_name(label: &str, kind: ArchiveKind) -> String {
    format!("{}{}", label, kind.extension())
}

/// Download `url` into the working directory as `<label><ext>` and extract it there.
///
/// The name of the extracted tree is dictated by the upstream archive.
/// Returns the path of the downloaded archive.
pub fn fetch_and_extract(ctx: &BuildContext<'_>, url: &str, label: &str) -> Result<PathBuf> {
    let kind = ArchiveKind::from_url(url)?;
    let archive = ctx.work_dir.join(archive_file_name(label, kind));

    ctx.shell
        .status(Status::Fetching, format!("{} from {}", label, url));
    ctx.downloader
        .download(url, &archive, ctx.shell)
        .with_context(|| format!("failed to fetch `{}`", label))?;

    ctx.shell.status(
        Status::Extracting,
        archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    ctx.runner
        .run(&kind.extract_command(&archive, &ctx.work_dir))
        .with_context(|| format!("failed to extract {}", archive.display()))?;

    Ok(archive)
}
