//! Byte-threshold progress tracking for streamed downloads.

/// Tracks bytes written and reports each time a further `step` bytes have
/// accumulated since the last report.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    step: u64,
    downloaded: u64,
    last_reported: u64,
}

impl ProgressTracker {
    pub fn new(step: u64) -> Self {
        Self {
            step: step.max(1),
            downloaded: 0,
            last_reported: 0,
        }
    }

    /// Adds `n` bytes. Returns the running total when it crossed the next step.
    pub fn advance(&mut self, n: usize) -> Option<u64> {
        self.downloaded += n as u64;
        if self.downloaded - self.last_reported >= self.step {
            self.last_reported = self.downloaded;
            Some(self.downloaded)
        } else {
            None
        }
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }
}
