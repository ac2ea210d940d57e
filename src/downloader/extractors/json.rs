// Parsing of `yt-dlp --dump-json` output, shared by both extractor modes

use crate::downloader::errors::StreamError;
use crate::downloader::models::{StreamFormat, VideoInfo};

/// Parse JSON output into VideoInfo
pub fn parse_video_info(stdout: &[u8]) -> Result<VideoInfo, StreamError> {
    let json_str = String::from_utf8_lossy(stdout);
    // yt-dlp may print more than one object for playlists; --no-playlist
    // should prevent that, but only the first line is ever relevant.
    let first = json_str
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| StreamError::Parse("Extractor produced no output".to_string()))?;

    let json: serde_json::Value = serde_json::from_str(first)?;
    let formats = parse_formats(&json)?;

    Ok(VideoInfo {
        id: json["id"].as_str().unwrap_or("unknown").to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        uploader: json["uploader"].as_str().unwrap_or("Unknown").to_string(),
        duration_seconds: json["duration"].as_f64().unwrap_or(0.0) as u64,
        webpage_url: json["webpage_url"].as_str().unwrap_or("").to_string(),
        formats,
    })
}

/// Parse formats array from JSON
fn parse_formats(json: &serde_json::Value) -> Result<Vec<StreamFormat>, StreamError> {
    let formats_array = json["formats"]
        .as_array()
        .ok_or_else(|| StreamError::Parse("No formats array in JSON".to_string()))?;

    let formats = formats_array
        .iter()
        .map(|f| StreamFormat {
            format_id: f["format_id"].as_str().unwrap_or("").to_string(),
            ext: f["ext"].as_str().unwrap_or("").to_string(),
            url: f["url"].as_str().map(|s| s.to_string()),
            protocol: f["protocol"].as_str().map(|s| s.to_string()),
            width: f["width"].as_u64().map(|w| w as u32),
            height: f["height"].as_u64().map(|h| h as u32),
            fps: f["fps"].as_f64().map(|fps| fps as f32),
            vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
            acodec: f["acodec"].as_str().map(|s| s.to_string()),
            filesize: f["filesize"].as_u64(),
            filesize_approx: f["filesize_approx"]
                .as_u64()
                .or_else(|| f["filesize_approx"].as_f64().map(|s| s as u64)),
            tbr: f["tbr"].as_f64().map(|t| t as f32),
        })
        .collect();

    Ok(formats)
}
