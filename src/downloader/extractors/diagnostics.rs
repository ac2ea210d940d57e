// Failure diagnostics - classifies yt-dlp stderr into a blocking reason
//
// The reason decides whether another extractor mode is worth trying and
// which hint gets logged next to the error.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // `[youtube] <id>: ` in front of yt-dlp messages; ids are arbitrary text
    static ref EXTRACTOR_PREFIX: Regex = Regex::new(r"^\[[^\]]+\]\s+[^\s:]+:\s*").unwrap();
    static ref URL: Regex = Regex::new(r"https?://\S+").unwrap();
    static ref DRM: Regex = Regex::new(r"\bdrm\b").unwrap();
    static ref HTTP_429: Regex = Regex::new(r"\b429\b").unwrap();
    static ref HTTP_403: Regex = Regex::new(r"\b403\b").unwrap();
}

/// Reasons why the hosting service might refuse a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockingReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,
    /// Streaming protection that hides formats from some clients
    SabrStreaming,
    /// Proof of Origin token required
    PoTokenRequired,
    AgeRestricted,
    GeoBlocked,
    /// Network timeout (soft IP block)
    NetworkTimeout,
    RateLimited,
    BotDetection,
    PrivateVideo,
    /// Video deleted or unavailable
    VideoUnavailable,
    /// DRM-protected or paid content
    DrmProtected,
    MembersOnly,
    /// URL not handled by any extractor
    UnsupportedUrl,
    Unknown,
}

impl BlockingReason {
    /// No other client or mode will get past this
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::DrmProtected
                | Self::VideoUnavailable
                | Self::PrivateVideo
                | Self::UnsupportedUrl
        )
    }

    /// Check if cookies might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::SabrStreaming
                | Self::PoTokenRequired
                | Self::AgeRestricted
                | Self::BotDetection
                | Self::MembersOnly
        )
    }

    /// Check if proxy might help
    pub fn proxy_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::GeoBlocked
                | Self::NetworkTimeout
                | Self::RateLimited
                | Self::BotDetection
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::SabrStreaming => "SABR streaming protection active",
            Self::PoTokenRequired => "Proof of Origin token required",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Geographic restriction",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::RateLimited => "Rate limited",
            Self::BotDetection => "Bot detection triggered",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::UnsupportedUrl => "Unsupported URL",
            Self::Unknown => "Unknown failure",
        }
    }

    /// One-line suggestion for the log
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_permanent() {
            return None;
        }
        match (self.cookies_might_help(), self.proxy_might_help()) {
            (true, true) => Some("try --cookies or --cookies-from-browser, or a --proxy"),
            (true, false) => Some("try --cookies or --cookies-from-browser"),
            (false, true) => Some("try again later or through a --proxy"),
            (false, false) => None,
        }
    }
}

/// Analyze error message and return blocking reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = message_text(error);
    let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    // Order matters: most specific first

    if DRM.is_match(&lower)
        || any(&[
            "widevine",
            "playready",
            "fairplay",
            "youtube premium",
            "requires purchase",
            "requires payment",
            "rental",
        ])
    {
        return Some(BlockingReason::DrmProtected);
    }

    if any(&["members only", "members-only", "join this channel", "available to members"]) {
        return Some(BlockingReason::MembersOnly);
    }

    if any(&["unsupported url", "is not a valid url", "invalid url"]) {
        return Some(BlockingReason::UnsupportedUrl);
    }

    if lower.contains("sabr") {
        return Some(BlockingReason::SabrStreaming);
    }

    if any(&["po token", "proof of origin"]) {
        return Some(BlockingReason::PoTokenRequired);
    }

    if any(&["age-restricted", "sign in to confirm your age", "age_verification"]) {
        return Some(BlockingReason::AgeRestricted);
    }

    if any(&["private video", "video is private", "sign in if you've been granted access"]) {
        return Some(BlockingReason::PrivateVideo);
    }

    if any(&[
        "video unavailable",
        "video has been removed",
        "no longer available",
        "video is unavailable",
    ]) {
        return Some(BlockingReason::VideoUnavailable);
    }

    if any(&[
        "not available in your country",
        "blocked in your country",
        "geo restrict",
        "geo-restrict",
    ]) {
        return Some(BlockingReason::GeoBlocked);
    }

    if HTTP_429.is_match(&lower) || any(&["rate limit", "too many requests"]) {
        return Some(BlockingReason::RateLimited);
    }

    if any(&["confirm you're not a bot", "captcha", "unusual traffic", "automated"]) {
        return Some(BlockingReason::BotDetection);
    }

    if HTTP_403.is_match(&lower) || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if any(&["timeout", "timed out", "connection refused", "network is unreachable"]) {
        return Some(BlockingReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(BlockingReason::Unknown);
    }

    None
}

/// Lowercased stderr without extractor/id prefixes and URLs, so video ids
/// and links cannot match any needle
fn message_text(error: &str) -> String {
    error
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line
                .strip_prefix("ERROR:")
                .or_else(|| line.strip_prefix("WARNING:"))
                .unwrap_or(line)
                .trim_start();
            let line = EXTRACTOR_PREFIX.replace(line, "");
            URL.replace_all(&line, "").to_lowercase()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
