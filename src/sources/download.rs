//! HTTP downloads of source and tool archives.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::error::BuildError;
use crate::util::shell::Shell;

/// Fetches a URL into a local file.
pub trait Downloader {
    /// Download the full body of `url` into `dest`, returning the byte count.
    fn download(&self, url: &str, dest: &Path, shell: &Shell) -> Result<u64>;
}

/// Plain HTTP(S) GET over `reqwest`, following redirects.
///
/// No authentication, retries or checksum verification.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("depbuild/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .context("failed to create HTTP client")?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path, shell: &Shell) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        if !response.status().is_success() {
            return Err(BuildError::DownloadFailed {
                url: url.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let mut progress = shell.bytes_progress(file_name, response.content_length());

        let file = File::create(dest)
            .with_context(|| format!("failed to create {}", dest.display()))?;
        let mut writer = BufWriter::new(file);
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            let n = response
                .read(&mut buf)
                .with_context(|| format!("failed to read response body from {}", url))?;
            if n == 0 {
                break;
            }
            writer
                .write_all(&buf[..n])
                .with_context(|| format!("failed to write {}", dest.display()))?;
            progress.inc(n as u64);
        }

        writer
            .flush()
            .with_context(|| format!("failed to write {}", dest.display()))?;
        progress.finish();

        tracing::debug!("downloaded {} bytes from {}", progress.position(), url);
        Ok(progress.position())
    }
}
