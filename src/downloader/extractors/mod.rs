// InfoExtractor module - video info extraction through yt-dlp
//
// Provides two modes:
// - Python mode: Uses `python3 -m yt_dlp` (better for YouTube, avoids bot detection)
// - CLI mode: Uses native `yt-dlp` binary (faster, no Python dependency)
//
// The Orchestrator switches between modes based on:
// - Service type (YouTube prefers Python)
// - Availability of Python/yt_dlp module
// - Previous failure (auto-fallback)

mod cli;
mod diagnostics;
mod json;
mod orchestrator;
mod python;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use json::parse_video_info;
pub use orchestrator::InfoExtractorOrchestrator;
pub use python::PythonInfoExtractor;
pub use traits::{ExtractorConfig, ExtractorMode, InfoExtractor};
