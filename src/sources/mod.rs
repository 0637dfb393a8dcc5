//! Archive sources.
//!
//! Sources are fetched over HTTP and unpacked by system tools.

pub mod archive;
pub mod download;

pub use archive::{fetch_and_extract, ArchiveKind};
pub use download::{Downloader, HttpDownloader};
