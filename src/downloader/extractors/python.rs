// Python InfoExtractor - uses `python3 -m yt_dlp`
//
// Advantages:
// - Better at bypassing YouTube bot detection
// - Works well with cookies/auth
//
// Disadvantages:
// - Requires Python 3 and the yt_dlp module
// - Slightly slower than the native binary

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use super::json::parse_video_info;
use super::traits::{ExtractorConfig, InfoExtractor};
use crate::downloader::errors::StreamError;
use crate::downloader::models::VideoInfo;
use crate::downloader::utils::{probe_command, run_output_with_timeout};

/// Project-local virtualenv interpreters, checked before the system python
const VENV_CANDIDATES: [&str; 4] = [
    "venv/bin/python3",
    ".venv/bin/python3",
    "venv/Scripts/python.exe",
    ".venv/Scripts/python.exe",
];

/// Python-based info extractor using the yt_dlp module
pub struct PythonInfoExtractor {
    python_cmd: String,
}

impl PythonInfoExtractor {
    pub fn new(python_override: Option<String>) -> Self {
        Self {
            python_cmd: python_override.unwrap_or_else(Self::find_python),
        }
    }

    pub fn python_cmd(&self) -> &str {
        &self.python_cmd
    }

    /// Find Python interpreter
    fn find_python() -> String {
        VENV_CANDIDATES
            .iter()
            .find(|p| Path::new(p).exists())
            .map(|p| p.to_string())
            .unwrap_or_else(|| "python3".to_string())
    }

    /// Build command arguments
    fn build_args(&self, url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "yt_dlp".to_string()];
        args.extend(config.common_args());

        // Default to web client for Python mode
        let client = config.player_client.as_deref().unwrap_or("web");
        args.push("--extractor-args".to_string());
        args.push(format!("youtube:player_client={}", client));

        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl InfoExtractor for PythonInfoExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    async fn is_available(&self, config: &ExtractorConfig) -> bool {
        probe_command(
            &self.python_cmd,
            &["-c", "import yt_dlp"],
            config.timeout_seconds as u64,
        )
        .await
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoInfo, StreamError> {
        if !self.is_available(config).await {
            return Err(StreamError::ToolNotFound(
                "Python yt_dlp module not installed".to_string(),
            ));
        }

        let args = self.build_args(url, config);
        debug!(python = %self.python_cmd, args = %args.join(" "), "running python extractor");

        let output =
            run_output_with_timeout(&self.python_cmd, &args, config.timeout_seconds as u64)
                .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StreamError::from_stderr(&stderr));
        }

        parse_video_info(&output.stdout)
    }
}
