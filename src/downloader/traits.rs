// Progress reporting for stream transfers

use tracing::info;

use super::models::DownloadProgress;

/// Receives a progress update after every chunk written to disk
pub trait ProgressSink: Send {
    fn on_progress(&mut self, progress: DownloadProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(DownloadProgress) + Send,
{
    fn on_progress(&mut self, progress: DownloadProgress) {
        self(progress)
    }
}

/// Logs progress to stderr, once per whole percent (or per MiB when the
/// total size is unknown)
#[derive(Debug, Default)]
pub struct LogProgress {
    last_step: Option<u64>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn step(progress: &DownloadProgress) -> u64 {
        match progress.percent {
            Some(p) => p as u64,
            None => progress.downloaded / (1024 * 1024),
        }
    }
}

impl ProgressSink for LogProgress {
    fn on_progress(&mut self, progress: DownloadProgress) {
        let step = Self::step(&progress);
        if self.last_step == Some(step) {
            return;
        }
        self.last_step = Some(step);

        match (progress.percent, progress.total) {
            (Some(percent), Some(total)) => info!(
                "downloaded {:.0}% ({} of {} bytes)",
                percent, progress.downloaded, total
            ),
            _ => info!("downloaded {} bytes", progress.downloaded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |p: DownloadProgress| seen.push(p.downloaded);
            sink.on_progress(DownloadProgress::new(1, None));
            sink.on_progress(DownloadProgress::new(2, None));
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn log_progress_steps() {
        let mut sink = LogProgress::new();
        sink.on_progress(DownloadProgress::new(10, Some(1000)));
        assert_eq!(sink.last_step, Some(1));
        sink.on_progress(DownloadProgress::new(15, Some(1000)));
        assert_eq!(sink.last_step, Some(1));
        sink.on_progress(DownloadProgress::new(500, Some(1000)));
        assert_eq!(sink.last_step, Some(50));
    }
}
