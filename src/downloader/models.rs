// Common data models for resolution and download

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One rendition reported by the extractor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamFormat {
    /// Format ID (e.g., "18", "22")
    pub format_id: String,
    /// Container extension (mp4, webm, m4a)
    pub ext: String,
    /// Direct media URL
    pub url: Option<String>,
    /// Transfer protocol (https, m3u8_native, http_dash_segments)
    pub protocol: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f32>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// File size in bytes
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<u64>,
    /// Total bitrate in kbps
    pub tbr: Option<f32>,
}

fn codec_present(codec: &Option<String>) -> bool {
    codec
        .as_deref()
        .map_or(false, |c| !c.is_empty() && c != "none")
}

impl StreamFormat {
    pub fn has_video(&self) -> bool {
        codec_present(&self.vcodec)
    }

    pub fn has_audio(&self) -> bool {
        codec_present(&self.acodec)
    }

    /// Video and audio muxed into one file reachable by a single GET
    pub fn is_progressive(&self) -> bool {
        let direct = self
            .protocol
            .as_deref()
            .map_or(true, |p| p == "https" || p == "http");

        direct && self.url.is_some() && self.has_video() && self.has_audio()
    }

    /// Vertical resolution, used for ordering
    pub fn resolution(&self) -> u32 {
        self.height.unwrap_or(0)
    }

    /// Get effective file size (exact or approximate)
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }
}

/// Video information extracted by yt-dlp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub duration_seconds: u64,
    pub webpage_url: String,
    pub formats: Vec<StreamFormat>,
}

/// Resolver success payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub stream_url: String,
    pub title: String,
    pub id: String,
    pub filesize: u64,
}

/// Downloader success payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub title: String,
}

/// Failure payload shared by both programs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Download progress information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
    pub percent: Option<f32>,
}

impl DownloadProgress {
    pub fn new(downloaded: u64, total: Option<u64>) -> Self {
        let percent = total
            .filter(|t| *t > 0)
            .map(|t| (downloaded as f64 / t as f64 * 100.0).min(100.0) as f32);

        Self {
            downloaded,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(vcodec: &str, acodec: &str, protocol: &str) -> StreamFormat {
        StreamFormat {
            format_id: "18".to_string(),
            ext: "mp4".to_string(),
            url: Some("https://cdn.example/v.mp4".to_string()),
            protocol: Some(protocol.to_string()),
            vcodec: Some(vcodec.to_string()),
            acodec: Some(acodec.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn progressive_needs_both_codecs() {
        assert!(format("avc1.42001E", "mp4a.40.2", "https").is_progressive());
        assert!(!format("avc1.42001E", "none", "https").is_progressive());
        assert!(!format("none", "mp4a.40.2", "https").is_progressive());
    }

    #[test]
    fn manifest_protocols_are_not_progressive() {
        assert!(!format("avc1", "mp4a", "m3u8_native").is_progressive());
    }

    #[test]
    fn progressive_needs_url() {
        let mut f = format("avc1", "mp4a", "https");
        f.url = None;
        assert!(!f.is_progressive());
    }

    #[test]
    fn progress_percent() {
        let p = DownloadProgress::new(50, Some(200));
        assert_eq!(p.percent, Some(25.0));

        assert_eq!(DownloadProgress::new(10, None).percent, None);
        assert_eq!(DownloadProgress::new(10, Some(0)).percent, None);
        assert_eq!(DownloadProgress::new(300, Some(200)).percent, Some(100.0));
    }

    #[test]
    fn error_response_shape() {
        let json = serde_json::to_string(&ErrorResponse::new("No URL provided")).unwrap();
        assert_eq!(json, r#"{"error":"No URL provided"}"#);
    }
}
