//! Resolve and download progressive video streams through yt-dlp.
//!
//! The library backs two binaries: `vidtok-resolve` prints the direct URL
//! and metadata of a video's best progressive MP4 stream, `vidtok-download`
//! saves that stream into a temp directory.

pub mod cli;
pub mod config;
pub mod downloader;

pub use downloader::{
    DownloadedFile, ErrorKind, ErrorResponse, ResolvedStream, StreamError, Streamer,
};
