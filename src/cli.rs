//! Entry-point logic shared by `vidtok-resolve` and `vidtok-download`.
//!
//! Both programs print exactly one JSON object to stdout. Logs go to
//! stderr. A missing URL (or any other invalid input) exits with status 1;
//! every other failure is reported in the JSON payload with status 0.

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DownloadArgs, ResolveArgs};
use crate::downloader::{ErrorKind, ErrorResponse, LogProgress, StreamError};

const NO_URL: &str = "No URL provided";

/// `serde_json` formatter producing `{"key": "value", "n": 1}` on one line
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

pub fn to_json_line<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn emit<T: Serialize>(value: &T) {
    let line = match to_json_line(value) {
        Ok(line) => line,
        Err(e) => error_line(&format!("Failed to encode response: {}", e)),
    };
    write_line(&mut io::stdout().lock(), &line);
}

/// Write one line; a closed reader (broken pipe) is not an error
fn write_line<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            warn!("failed to write response: {}", e);
        }
    }
}

fn error_line(message: &str) -> String {
    // ErrorResponse is a single string field; encoding cannot fail
    to_json_line(&ErrorResponse::new(message))
        .unwrap_or_else(|_| r#"{"error": "unknown error"}"#.to_string())
}

pub fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidInput => 1,
        ErrorKind::NoStream | ErrorKind::Failure => 0,
    }
}

/// Print the JSON payload for `result` and pick the exit status
pub fn finish<T: Serialize>(result: Result<T, StreamError>) -> ExitCode {
    match result {
        Ok(value) => {
            emit(&value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.kind() {
                ErrorKind::Failure => error!("{}", e),
                _ => warn!("{}", e),
            }
            if let Some(reason) = e.blocking_reason() {
                warn!(
                    "diagnosis: {}{}",
                    reason.description(),
                    reason.hint().map(|h| format!(" ({})", h)).unwrap_or_default()
                );
            }
            emit(&ErrorResponse::new(e.to_string()));
            ExitCode::from(exit_status(e.kind()))
        }
    }
}

pub fn init_logging(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("VIDTOK_LOG").unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    // a second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse arguments; `Err` carries the exit status after help/version/errors
fn parse_args<P: Parser>() -> Result<P, ExitCode> {
    match P::try_parse() {
        Ok(args) => Ok(args),
        Err(e) => match e.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                let _ = e.print();
                Err(ExitCode::SUCCESS)
            }
            _ => {
                let rendered = e.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .map(|l| l.trim_start_matches("error: ").trim())
                    .filter(|l| !l.is_empty())
                    .unwrap_or("Invalid arguments");
                emit(&ErrorResponse::new(message));
                Err(ExitCode::from(1))
            }
        },
    }
}

fn require_url(url: Option<String>) -> Result<String, StreamError> {
    url.filter(|u| !u.trim().is_empty())
        .ok_or_else(|| StreamError::InvalidInput(NO_URL.to_string()))
}

pub async fn run_resolve() -> ExitCode {
    let args: ResolveArgs = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };
    init_logging(args.extractor.verbose, "warn");

    let result = async {
        let url = require_url(args.url.clone())?;
        let streamer = args.extractor.build_streamer()?;
        streamer.resolve(&url).await
    }
    .await;

    finish(result)
}

pub async fn run_download() -> ExitCode {
    let args: DownloadArgs = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };
    init_logging(args.extractor.verbose, "info");

    let result = async {
        let url = require_url(args.url.clone())?;
        let streamer = args.extractor.build_streamer()?;
        let mut progress = LogProgress::new();
        streamer
            .download(&url, &args.output_dir(), &mut progress)
            .await
    }
    .await;

    finish(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::ResolvedStream;

    #[test]
    fn error_line_matches_expected_text() {
        assert_eq!(error_line(NO_URL), r#"{"error": "No URL provided"}"#);
    }

    #[test]
    fn resolved_stream_line() {
        let line = to_json_line(&ResolvedStream {
            stream_url: "https://cdn.example/v.mp4".into(),
            title: "Title".into(),
            id: "abc".into(),
            filesize: 42,
        })
        .unwrap();

        assert_eq!(
            line,
            r#"{"stream_url": "https://cdn.example/v.mp4", "title": "Title", "id": "abc", "filesize": 42}"#
        );
        let back: ResolvedStream = serde_json::from_str(&line).unwrap();
        assert_eq!(back.filesize, 42);
    }

    #[test]
    fn arrays_get_spaces_too() {
        assert_eq!(to_json_line(&vec![1, 2, 3]).unwrap(), "[1, 2, 3]");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn closed_stdout_does_not_panic() {
        write_line(&mut ClosedPipe, r#"{"error": "No URL provided"}"#);

        let mut buf = Vec::new();
        write_line(&mut buf, "{}");
        assert_eq!(buf, b"{}\n");
    }

    #[test]
    fn exit_status_by_kind() {
        assert_eq!(exit_status(ErrorKind::InvalidInput), 1);
        assert_eq!(exit_status(ErrorKind::NoStream), 0);
        assert_eq!(exit_status(ErrorKind::Failure), 0);
    }

    #[test]
    fn blank_url_is_missing() {
        assert!(matches!(
            require_url(Some("  ".into())),
            Err(StreamError::InvalidInput(_))
        ));
        assert_eq!(require_url(Some("u".into())).unwrap(), "u");
        assert_eq!(require_url(None).unwrap_err().to_string(), NO_URL);
    }
}
