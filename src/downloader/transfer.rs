// HTTP side of the downloader: size probes and streaming file transfer

use reqwest::header::CONTENT_LENGTH;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::errors::StreamError;
use super::models::DownloadProgress;
use super::traits::ProgressSink;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// What a transfer did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    /// File was already present with the expected size
    Skipped { path: PathBuf },
}

impl TransferOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded { path, .. } | Self::Skipped { path } => path,
        }
    }
}

pub struct StreamFetcher {
    client: reqwest::Client,
}

impl StreamFetcher {
    /// Build client with optional proxy. `connect_timeout_secs` bounds the
    /// connection phase only; long transfers are not cut off.
    pub fn new(proxy: Option<&str>, connect_timeout_secs: u64) -> Result<Self, StreamError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .user_agent(BROWSER_UA);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                StreamError::InvalidInput(format!("Invalid proxy URL {}: {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// `Content-Length` of `url` from a HEAD request, if the server sends one
    pub async fn content_length(&self, url: &str) -> Result<Option<u64>, StreamError> {
        let response = self
            .client
            .head(url)
            .send()
            .await?
            .error_for_status()?;

        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        debug!(url, ?length, "probed content length");
        Ok(length)
    }

    /// Download `url` into `path`.
    ///
    /// When `expected_size` is known and `path` already holds exactly that
    /// many bytes, nothing is fetched. An interrupted transfer leaves the
    /// partial file behind.
    pub async fn download_to(
        &self,
        url: &str,
        path: &Path,
        expected_size: Option<u64>,
        progress: &mut dyn ProgressSink,
    ) -> Result<TransferOutcome, StreamError> {
        if let (Some(expected), Ok(meta)) = (expected_size, tokio::fs::metadata(path).await) {
            if meta.is_file() && meta.len() == expected {
                info!("{} already downloaded, skipping", path.display());
                return Ok(TransferOutcome::Skipped {
                    path: path.to_path_buf(),
                });
            }
        }

        let mut response = self.client.get(url).send().await?.error_for_status()?;
        let total = response.content_length().or(expected_size);

        info!(
            "downloading {} bytes to {}",
            total.map_or("?".to_string(), |t| t.to_string()),
            path.display()
        );

        let mut file = File::create(path).await?;
        let mut downloaded: u64 = 0;

        progress.on_progress(DownloadProgress::new(0, total));
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            progress.on_progress(DownloadProgress::new(downloaded, total));
        }
        file.flush().await?;

        Ok(TransferOutcome::Downloaded {
            path: path.to_path_buf(),
            bytes: downloaded,
        })
    }
}
