// CLI InfoExtractor - uses the native `yt-dlp` binary
//
// Faster than Python mode and needs no interpreter, but more likely to
// trigger YouTube bot detection, so several player clients are tried.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::json::parse_video_info;
use super::traits::{is_youtube, ExtractorConfig, InfoExtractor};
use crate::downloader::errors::StreamError;
use crate::downloader::models::VideoInfo;
use crate::downloader::utils::{probe_command, run_output_with_timeout};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// CLI-based info extractor using yt-dlp binary
pub struct CliInfoExtractor {
    ytdlp_path: String,
}

impl CliInfoExtractor {
    pub fn new(path_override: Option<String>) -> Self {
        Self {
            ytdlp_path: path_override.unwrap_or_else(Self::find_ytdlp),
        }
    }

    pub fn ytdlp_path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Find yt-dlp binary; falls back to a PATH lookup at spawn time
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
            "/usr/bin/yt-dlp",
        ];

        common_paths
            .iter()
            .find(|p| std::path::Path::new(p).exists())
            .map(|p| p.to_string())
            .unwrap_or_else(|| "yt-dlp".to_string())
    }

    fn build_args(&self, url: &str, config: &ExtractorConfig, client: Option<&str>) -> Vec<String> {
        let mut args = config.common_args();
        args.push("--user-agent".to_string());
        args.push(USER_AGENT.to_string());

        if let Some(client) = client {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        args.push(url.to_string());
        args
    }

    /// Player clients to try in order. Android is less likely to be
    /// blocked; web handles age-gated content when cookies are present.
    fn clients_for(url: &str, config: &ExtractorConfig) -> Vec<Option<String>> {
        if !is_youtube(url) {
            return vec![None];
        }
        if let Some(client) = &config.player_client {
            return vec![Some(client.clone())];
        }

        let has_cookies = config.cookies_path.is_some() || config.cookies_from_browser.is_some();
        let order: &[&str] = if has_cookies {
            &["web", "android"]
        } else {
            &["android", "tv", "web"]
        };
        order.iter().map(|c| Some(c.to_string())).collect()
    }

    async fn try_with_clients(
        &self,
        url: &str,
        config: &ExtractorConfig,
        clients: &[Option<String>],
    ) -> Result<VideoInfo, StreamError> {
        let mut last_error = StreamError::ToolNotFound("No clients to try".to_string());

        for client in clients {
            let label = client.as_deref().unwrap_or("default");
            let args = self.build_args(url, config, client.as_deref());
            debug!(client = label, "{} {}", self.ytdlp_path, args.join(" "));

            match run_output_with_timeout(&self.ytdlp_path, &args, config.timeout_seconds as u64)
                .await
            {
                Ok(out) if out.status.success() => {
                    debug!(client = label, "yt-dlp succeeded");
                    return parse_video_info(&out.stdout);
                }
                Ok(out) => {
                    let stderr = String::from_utf8_lossy(&out.stderr);
                    let err = StreamError::from_stderr(&stderr);
                    warn!(client = label, error = %err, "yt-dlp client failed");
                    let permanent = err.blocking_reason().map_or(false, |r| r.is_permanent());
                    last_error = err;
                    if permanent {
                        break;
                    }
                }
                Err(e) => {
                    warn!(client = label, error = %e, "yt-dlp did not complete");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn is_available(&self, config: &ExtractorConfig) -> bool {
        probe_command(&self.ytdlp_path, &["--version"], config.timeout_seconds as u64).await
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoInfo, StreamError> {
        if !self.is_available(config).await {
            return Err(StreamError::ToolNotFound(
                "yt-dlp binary not found".to_string(),
            ));
        }

        let clients = Self::clients_for(url, config);
        self.try_with_clients(url, config, &clients).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_without_cookies_prefers_android() {
        let clients = CliInfoExtractor::clients_for(
            "https://www.youtube.com/watch?v=x",
            &ExtractorConfig::default(),
        );
        assert_eq!(clients[0].as_deref(), Some("android"));
        assert_eq!(clients.len(), 3);
    }

    #[test]
    fn youtube_with_cookies_prefers_web() {
        let config = ExtractorConfig::default().with_cookies_from_browser(Some("firefox".into()));
        let clients = CliInfoExtractor::clients_for("https://youtu.be/x", &config);
        assert_eq!(clients[0].as_deref(), Some("web"));
    }

    #[test]
    fn other_hosts_use_default_client() {
        let clients =
            CliInfoExtractor::clients_for("https://vimeo.com/1", &ExtractorConfig::default());
        assert_eq!(clients, vec![None]);

        let extractor = CliInfoExtractor::new(Some("yt-dlp".into()));
        let args = extractor.build_args("https://vimeo.com/1", &ExtractorConfig::default(), None);
        assert!(!args.iter().any(|a| a == "--extractor-args"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_binary_respects_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("yt-dlp");
        std::fs::write(&script, "#!/bin/sh\nsleep 20\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = CliInfoExtractor::new(Some(script.to_string_lossy().into_owned()));
        let config = ExtractorConfig::default().with_timeout(1);
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(6),
            extractor.extract("https://vimeo.com/1", &config),
        )
        .await;

        assert!(matches!(result, Ok(Err(_))));
    }

    #[test]
    fn explicit_client_is_the_only_one() {
        let config = ExtractorConfig::default().with_player_client(Some("tv".into()));
        let clients = CliInfoExtractor::clients_for("https://youtu.be/x", &config);
        assert_eq!(clients, vec![Some("tv".to_string())]);
    }
}
