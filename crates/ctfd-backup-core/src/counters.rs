//! Run-scoped processed/failed counters for the category currently being
//! backed up.
//!
//! One mutex guards the counts and the progress/skip log lines emitted for
//! them, so a log line and its increment are atomic relative to other workers.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Category;

/// A progress line is logged on every Nth successful entity.
pub const PROGRESS_EVERY: usize = 10;

/// Snapshot of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterState {
    pub category: Option<Category>,
    pub processed: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct RunCounters {
    state: Mutex<CounterState>,
}

impl Default for RunCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl RunCounters {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CounterState {
                category: None,
                processed: 0,
                failed: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CounterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset both counts to zero and scope them to `category`.
    pub fn begin(&self, category: Category) {
        *self.lock() = CounterState {
            category: Some(category),
            processed: 0,
            failed: 0,
        };
    }

    /// Count one successfully backed-up entity out of `total`. Every
    /// [`PROGRESS_EVERY`]th success logs a progress line. Returns the new count.
    pub fn record_success(&self, total: usize) -> usize {
        let mut state = self.lock();
        state.processed += 1;
        let processed = state.processed;
        if processed % PROGRESS_EVERY == 0 {
            tracing::info!(
                category = %tag(&state),
                "progress: {}/{}",
                processed,
                total
            );
        }
        processed
    }

    /// Count one skipped or failed entity, logging `reason`. Returns the new count.
    pub fn record_failure(&self, label: &str, reason: &dyn fmt::Display) -> usize {
        let mut state = self.lock();
        state.failed += 1;
        tracing::warn!(category = %tag(&state), "{} skipped: {}", label, reason);
        state.failed
    }

    pub fn snapshot(&self) -> CounterState {
        *self.lock()
    }
}

fn tag(state: &CounterState) -> &'static str {
    state.category.map(Category::tag).unwrap_or("-")
}
