// Streamer - the two operations the binaries expose
//
// resolve:  URL -> extractor -> best progressive MP4 -> direct URL + metadata
// download: same selection, then an HTTP transfer into the output directory

use std::path::Path;
use tracing::{debug, info};

use super::errors::StreamError;
use super::extractors::{ExtractorConfig, InfoExtractor};
use super::format_selector::select_progressive_mp4;
use super::models::{DownloadedFile, ResolvedStream, StreamFormat, VideoInfo};
use super::traits::ProgressSink;
use super::transfer::{StreamFetcher, TransferOutcome};
use super::utils::{ensure_dir, sanitize_filename};

pub struct Streamer {
    extractor: Box<dyn InfoExtractor>,
    config: ExtractorConfig,
    fetcher: StreamFetcher,
}

impl Streamer {
    pub fn new(
        extractor: Box<dyn InfoExtractor>,
        config: ExtractorConfig,
        fetcher: StreamFetcher,
    ) -> Self {
        Self {
            extractor,
            config,
            fetcher,
        }
    }

    /// Extract `url` and pick the highest-resolution progressive MP4
    pub async fn select(&self, url: &str) -> Result<(VideoInfo, StreamFormat), StreamError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StreamError::InvalidInput("No URL provided".to_string()));
        }

        let mut info = self.extractor.extract(url, &self.config).await?;
        debug!(
            id = %info.id,
            formats = info.formats.len(),
            "extracted with {}",
            self.extractor.name()
        );

        let format = select_progressive_mp4(&info.formats)
            .cloned()
            .ok_or(StreamError::NoSuitableStream)?;
        info.formats.clear();

        info!(
            id = %info.id,
            format = %format.format_id,
            height = format.resolution(),
            "selected stream"
        );
        Ok((info, format))
    }

    pub async fn resolve(&self, url: &str) -> Result<ResolvedStream, StreamError> {
        let (info, format) = self.select(url).await?;
        let stream_url = format.url.clone().ok_or(StreamError::NoSuitableStream)?;

        let filesize = match format.effective_size() {
            Some(size) => size,
            None => self.probe_size(&stream_url).await.unwrap_or(0),
        };

        Ok(ResolvedStream {
            stream_url,
            title: info.title,
            id: info.id,
            filesize,
        })
    }

    pub async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<DownloadedFile, StreamError> {
        let (info, format) = self.select(url).await?;
        let stream_url = format.url.as_deref().ok_or(StreamError::NoSuitableStream)?;

        ensure_dir(output_dir).await?;
        let path = output_dir.join(Self::file_name(&info));

        // approximate sizes are useless for the skip check
        let expected = match format.filesize {
            Some(size) => Some(size),
            None => self.probe_size(stream_url).await,
        };

        let outcome = self
            .fetcher
            .download_to(stream_url, &path, expected, progress)
            .await?;

        if let TransferOutcome::Downloaded { bytes, .. } = &outcome {
            info!("saved {} bytes to {}", bytes, path.display());
        }

        Ok(DownloadedFile {
            path: outcome.path().to_path_buf(),
            title: info.title,
        })
    }

    /// Sanitised title with `.mp4`, or the video id when nothing survives
    pub fn file_name(info: &VideoInfo) -> String {
        let stem = sanitize_filename(&info.title);
        let stem = if stem.is_empty() {
            sanitize_filename(&info.id)
        } else {
            stem
        };
        let stem = if stem.is_empty() { "video".to_string() } else { stem };
        format!("{}.mp4", stem)
    }

    async fn probe_size(&self, stream_url: &str) -> Option<u64> {
        match self.fetcher.content_length(stream_url).await {
            Ok(size) => size,
            Err(e) => {
                debug!(error = %e, "size probe failed");
                None
            }
        }
    }
}
