// InfoExtractor trait and common types

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::downloader::errors::StreamError;
use crate::downloader::models::VideoInfo;

/// Extraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// Python module yt_dlp
    Python,
    /// CLI binary yt-dlp
    Cli,
    /// Auto-select by host, with fallback to the other mode
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown extractor mode '{}' (expected python, cli or auto)",
                other
            )),
        }
    }
}

/// Configuration for info extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub mode: ExtractorMode,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// Browser to read cookies from (e.g. "chrome")
    pub cookies_from_browser: Option<String>,
    /// Subprocess timeout in seconds
    pub timeout_seconds: u32,
    /// YouTube player client (android, web, tv)
    pub player_client: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            proxy: None,
            cookies_path: None,
            cookies_from_browser: None,
            timeout_seconds: 30,
            player_client: None,
        }
    }
}

impl ExtractorConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_cookies_from_browser(mut self, browser: Option<String>) -> Self {
        self.cookies_from_browser = browser;
        self
    }

    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_player_client(mut self, client: Option<String>) -> Self {
        self.player_client = client;
        self
    }

    /// yt-dlp flags shared by every mode, without the URL
    pub(crate) fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
            "--retries".to_string(),
            "2".to_string(),
        ];

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        } else if let Some(browser) = &self.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }
}

pub(crate) fn is_youtube(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

/// Trait for info extractors
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available, bounded by the config timeout
    async fn is_available(&self, config: &ExtractorConfig) -> bool;

    /// Extract video info with formats
    async fn extract(&self, url: &str, config: &ExtractorConfig)
        -> Result<VideoInfo, StreamError>;
}
