// Error types for stream resolution and download

use thiserror::Error;

use super::extractors::{diagnose_error, BlockingReason};

pub type StreamResult<T> = Result<T, StreamError>;

/// Coarse classification callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing command-line input
    InvalidInput,
    /// Extraction worked but no progressive MP4 rendition exists
    NoStream,
    /// Network, extractor or filesystem failure
    Failure,
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("No suitable stream found")]
    NoSuitableStream,

    /// yt-dlp or python not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// yt-dlp exited with an error
    #[error("{message}")]
    Extraction {
        message: String,
        reason: Option<BlockingReason>,
    },

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NoSuitableStream => ErrorKind::NoStream,
            _ => ErrorKind::Failure,
        }
    }

    /// Build an extraction error from raw yt-dlp stderr.
    ///
    /// The message is the first `ERROR:` line with its prefix stripped, or
    /// the trimmed stderr when yt-dlp printed no such line.
    pub fn from_stderr(stderr: &str) -> Self {
        let reason = diagnose_error(stderr);
        let message = stderr
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("ERROR:"))
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| stderr.trim().to_string());

        let message = if message.is_empty() {
            "Extractor failed without output".to_string()
        } else {
            message
        };

        Self::Extraction { message, reason }
    }

    pub fn blocking_reason(&self) -> Option<BlockingReason> {
        match self {
            Self::Extraction { reason, .. } => *reason,
            Self::Timeout(_) => Some(BlockingReason::NetworkTimeout),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Network(format!("request timed out: {}", e));
        }
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("Invalid JSON: {}", e))
    }
}
