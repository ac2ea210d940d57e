use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    vidtok_streamer::cli::run_resolve().await
}
