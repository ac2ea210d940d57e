//! Command-line and environment configuration for both binaries.

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::downloader::extractors::{
    CliInfoExtractor, ExtractorConfig, ExtractorMode, InfoExtractorOrchestrator,
    PythonInfoExtractor,
};
use crate::downloader::transfer::StreamFetcher;
use crate::downloader::utils::expand_home;
use crate::downloader::{StreamError, Streamer};

/// Subdirectory of the system temp dir that receives downloads
pub const CACHE_DIR_NAME: &str = "vidtok_cache";

/// Options shared by the resolver and the downloader
#[derive(Debug, Clone, Args)]
pub struct ExtractorArgs {
    /// Extractor mode: python, cli or auto
    #[arg(long, env = "VIDTOK_EXTRACTOR", default_value = "auto")]
    pub mode: ExtractorMode,

    /// Path to the yt-dlp binary
    #[arg(long = "ytdlp", env = "VIDTOK_YTDLP")]
    pub ytdlp_path: Option<String>,

    /// Python interpreter with the yt_dlp module installed
    #[arg(long, env = "YTDLP_PYTHON")]
    pub python: Option<String>,

    /// Proxy for yt-dlp and the stream transfer (e.g. socks5://127.0.0.1:1080)
    #[arg(long, env = "VIDTOK_PROXY")]
    pub proxy: Option<String>,

    /// Netscape-format cookies file passed to yt-dlp
    #[arg(long, env = "VIDTOK_COOKIES")]
    pub cookies: Option<String>,

    /// Browser to read cookies from (chrome, firefox, ...)
    #[arg(long, env = "VIDTOK_COOKIES_BROWSER")]
    pub cookies_from_browser: Option<String>,

    /// Extractor and connect timeout in seconds
    #[arg(
        long,
        env = "VIDTOK_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub timeout: u32,

    /// YouTube player client to force (android, web, tv)
    #[arg(long, env = "VIDTOK_PLAYER_CLIENT")]
    pub player_client: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExtractorArgs {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_mode(self.mode)
            .with_proxy(self.proxy.clone())
            .with_cookies_path(
                self.cookies
                    .as_deref()
                    .map(|p| expand_home(p).to_string_lossy().into_owned()),
            )
            .with_cookies_from_browser(self.cookies_from_browser.clone())
            .with_timeout(self.timeout)
            .with_player_client(self.player_client.clone())
    }

    /// Wire extractors, HTTP client and config into a `Streamer`
    pub fn build_streamer(&self) -> Result<Streamer, StreamError> {
        let orchestrator = InfoExtractorOrchestrator::new(
            PythonInfoExtractor::new(self.python.clone()),
            CliInfoExtractor::new(self.ytdlp_path.clone()),
        );
        let fetcher = StreamFetcher::new(self.proxy.as_deref(), self.timeout as u64)?;

        Ok(Streamer::new(
            Box::new(orchestrator),
            self.extractor_config(),
            fetcher,
        ))
    }
}

/// Resolve a video URL to its best progressive MP4 stream
#[derive(Debug, Parser)]
#[command(name = "vidtok-resolve", version, about)]
pub struct ResolveArgs {
    /// Video page URL
    pub url: Option<String>,

    #[command(flatten)]
    pub extractor: ExtractorArgs,
}

/// Download a video's best progressive MP4 stream into a temp directory
#[derive(Debug, Parser)]
#[command(name = "vidtok-download", version, about)]
pub struct DownloadArgs {
    /// Video page URL
    pub url: Option<String>,

    /// Directory that receives the file
    #[arg(long, env = "VIDTOK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub extractor: ExtractorArgs,
}

impl DownloadArgs {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(default_output_dir)
    }
}

pub fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIR_NAME)
}
