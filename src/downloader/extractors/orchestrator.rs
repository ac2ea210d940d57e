// InfoExtractor Orchestrator - mode selection and fallback
//
// Strategy:
// 1. For YouTube: Python mode preferred (better anti-bot bypass)
// 2. For other sites: CLI mode preferred (faster)
// 3. Fall back to the other mode unless the failure is permanent

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::cli::CliInfoExtractor;
use super::python::PythonInfoExtractor;
use super::traits::{is_youtube, ExtractorConfig, ExtractorMode, InfoExtractor};
use crate::downloader::errors::StreamError;
use crate::downloader::models::VideoInfo;

/// Orchestrator that manages Python and CLI extractors
pub struct InfoExtractorOrchestrator {
    python: PythonInfoExtractor,
    cli: CliInfoExtractor,
}

impl InfoExtractorOrchestrator {
    pub fn new(python: PythonInfoExtractor, cli: CliInfoExtractor) -> Self {
        Self { python, cli }
    }

    fn extractor(&self, mode: ExtractorMode) -> &dyn InfoExtractor {
        match mode {
            ExtractorMode::Python => &self.python,
            _ => &self.cli,
        }
    }

    /// Mode order for `url` under `Auto`
    pub fn mode_order(url: &str) -> [ExtractorMode; 2] {
        if is_youtube(url) {
            [ExtractorMode::Python, ExtractorMode::Cli]
        } else {
            [ExtractorMode::Cli, ExtractorMode::Python]
        }
    }

    async fn extract_auto(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoInfo, StreamError> {
        let mut last_error: Option<StreamError> = None;

        for mode in Self::mode_order(url) {
            let extractor = self.extractor(mode);

            // extract() probes availability itself
            info!(extractor = extractor.name(), "extracting {}", url);
            match extractor.extract(url, config).await {
                Ok(info) => return Ok(info),
                Err(StreamError::ToolNotFound(reason)) => {
                    debug!(extractor = extractor.name(), %reason, "extractor unavailable, skipping");
                }
                Err(e) => {
                    warn!(extractor = extractor.name(), error = %e, "extraction failed");
                    let permanent = e.blocking_reason().map_or(false, |r| r.is_permanent());
                    last_error = Some(e);
                    if permanent {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            StreamError::ToolNotFound(
                "Neither Python yt_dlp nor yt-dlp binary available".to_string(),
            )
        }))
    }
}

#[async_trait]
impl InfoExtractor for InfoExtractorOrchestrator {
    fn name(&self) -> &'static str {
        "auto"
    }

    async fn is_available(&self, config: &ExtractorConfig) -> bool {
        self.python.is_available(config).await || self.cli.is_available(config).await
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoInfo, StreamError> {
        match config.mode {
            ExtractorMode::Auto => self.extract_auto(url, config).await,
            mode => self.extractor(mode).extract(url, config).await,
        }
    }
}
