// Helper functions shared by extractors and the transfer layer

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};
use tracing::warn;

use super::errors::StreamError;

lazy_static! {
    // Characters rejected by NTFS/FAT plus ASCII control characters
    static ref UNSAFE_CHARS: Regex = Regex::new(r##"[\x00-\x1f\x7f"#$%'*,./:;<>?\\^|~\[\]{}]"##).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const MAX_FILENAME_BYTES: usize = 255;

/// Run command with timeout, capturing stdout and stderr
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<std::process::Output, StreamError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                StreamError::ToolNotFound(format!("{}: {}", program, e))
            }
            _ => StreamError::Io(e),
        })?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        StreamError::Io(std::io::Error::other(format!(
            "Failed to capture stdout from {}",
            program
        )))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        StreamError::Io(std::io::Error::other(format!(
            "Failed to capture stderr from {}",
            program
        )))
    })?;

    let collect = async {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let (out_res, err_res) = tokio::join!(
            stdout_pipe.read_to_end(&mut stdout),
            stderr_pipe.read_to_end(&mut stderr),
        );
        out_res?;
        err_res?;
        let status = child.wait().await?;
        Ok::<_, std::io::Error>(std::process::Output {
            status,
            stdout,
            stderr,
        })
    };

    match timeout(Duration::from_secs(timeout_secs), collect).await {
        Ok(output) => Ok(output?),
        // child is dropped with kill_on_drop set
        Err(_) => Err(StreamError::Timeout(timeout_secs)),
    }
}

/// Check that a program starts and exits successfully with `args` within
/// `timeout_secs`; a hung program is killed and counts as unavailable
pub async fn probe_command(program: &str, args: &[&str], timeout_secs: u64) -> bool {
    let status = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match timeout(Duration::from_secs(timeout_secs), status).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(_)) => false,
        Err(_) => {
            warn!("{} {} timed out after {}s", program, args.join(" "), timeout_secs);
            false
        }
    }
}

/// Turn a video title into a name that is valid on common filesystems
pub fn sanitize_filename(title: &str) -> String {
    // tabs and newlines are control characters; turn them into spaces first
    let spaced = WHITESPACE.replace_all(title, " ");
    let stripped = UNSAFE_CHARS.replace_all(&spaced, "");
    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ");

    let mut name = collapsed.into_owned();
    if name.len() > MAX_FILENAME_BYTES {
        let mut cut = MAX_FILENAME_BYTES;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
        name = name.trim_end().to_string();
    }
    name
}

/// Create `dir` and its parents; succeeds if it already exists
pub async fn ensure_dir(dir: &Path) -> Result<(), StreamError> {
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_unsafe_characters() {
        assert_eq!(
            sanitize_filename("AC/DC: Back in Black? (Official Video)"),
            "ACDC Back in Black (Official Video)"
        );
        assert_eq!(sanitize_filename("a\tb\n  c"), "a b c");
        assert_eq!(sanitize_filename("???"), "");
    }

    #[test]
    fn sanitize_keeps_unicode() {
        assert_eq!(sanitize_filename("Привет мир"), "Привет мир");
    }

    #[test]
    fn sanitize_truncates_on_char_boundary() {
        let title = "é".repeat(200);
        let name = sanitize_filename(&title);
        assert!(name.len() <= MAX_FILENAME_BYTES);
        assert!(name.chars().all(|c| c == 'é'));
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/cookies.txt"), PathBuf::from("/tmp/cookies.txt"));
    }

    #[tokio::test]
    async fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("vidtok_cache");

        ensure_dir(&dir).await.unwrap();
        ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn missing_program_is_tool_not_found() {
        let err = run_output_with_timeout("vidtok-definitely-missing-binary", &[], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_program_times_out() {
        let args = vec!["5".to_string()];
        let err = run_output_with_timeout("sleep", &args, 1).await.unwrap_err();
        assert!(matches!(err, StreamError::Timeout(1)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_probe_is_unavailable() {
        let started = std::time::Instant::now();
        assert!(!probe_command("sleep", &["5"], 1).await);
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
        assert!(probe_command("true", &[], 5).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_both_streams() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2".to_string()];
        let output = run_output_with_timeout("sh", &args, 5).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "out");
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "err");
    }
}
