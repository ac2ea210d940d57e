// Downloader module - stream resolution and download on top of yt-dlp

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod traits;
pub mod transfer;
pub mod utils;

pub use errors::{ErrorKind, StreamError, StreamResult};
pub use models::{DownloadProgress, DownloadedFile, ErrorResponse, ResolvedStream, StreamFormat, VideoInfo};
pub use orchestrator::Streamer;
pub use traits::{LogProgress, ProgressSink};
