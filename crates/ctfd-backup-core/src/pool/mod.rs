//! Bounded worker pool over OS threads.
//!
//! Keeps up to `cap` units running at once: workers pull from a shared queue
//! and send each outcome back over a channel as soon as it is ready, so the
//! caller sees results in completion order, not submission order. Every unit
//! is run behind a panic boundary; a panicking unit becomes
//! [`UnitOutcome::Failed`] and its worker moves on to the next unit.
//!
//! Nested pools (attachments inside a challenge) are separate `WorkerPool`
//! instances with their own cap.

mod outcome;

pub use outcome::{SkipReason, UnitOutcome};

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Outcome counts of one pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PoolStats {
    pub fn total(&self) -> usize {
        self.done + self.skipped + self.failed
    }

    fn count<T>(&mut self, outcome: &UnitOutcome<T>) {
        match outcome {
            UnitOutcome::Done(_) => self.done += 1,
            UnitOutcome::Skipped(_) => self.skipped += 1,
            UnitOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// A fixed-size pool of scoped worker threads.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    cap: usize,
}

impl WorkerPool {
    /// Create a pool running at most `cap` units at once (minimum 1).
    pub fn new(name: &'static str, cap: usize) -> Self {
        Self {
            name,
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Runs `work` over every item and hands each outcome to `sink` on the
    /// calling thread, in completion order, together with the item's
    /// submission index. Returns once every unit has finished.
    pub fn run_each<I, R, W, S>(&self, items: Vec<I>, work: W, mut sink: S) -> PoolStats
    where
        I: Send,
        R: Send,
        W: Fn(I) -> UnitOutcome<R> + Sync,
        S: FnMut(usize, UnitOutcome<R>),
    {
        let mut stats = PoolStats::default();
        let count = items.len();
        if count == 0 {
            return stats;
        }

        let queue: Mutex<VecDeque<(usize, I)>> = Mutex::new(items.into_iter().enumerate().collect());
        let (tx, rx) = mpsc::channel::<(usize, UnitOutcome<R>)>();
        let num_workers = self.cap.min(count);
        tracing::debug!(pool = self.name, workers = num_workers, units = count, "pool start");

        thread::scope(|s| {
            for _ in 0..num_workers {
                let tx = tx.clone();
                let queue = &queue;
                let work = &work;
                let name = self.name;
                s.spawn(move || loop {
                    let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
                    let Some((index, item)) = next else {
                        break;
                    };
                    let outcome = run_unit(name, index, work, item);
                    if tx.send((index, outcome)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for (index, outcome) in rx {
                stats.count(&outcome);
                sink(index, outcome);
            }
        });

        tracing::debug!(
            pool = self.name,
            done = stats.done,
            skipped = stats.skipped,
            failed = stats.failed,
            "pool finished"
        );
        stats
    }

    /// Like [`run_each`](Self::run_each), collecting outcomes in completion order.
    pub fn run<I, R, W>(&self, items: Vec<I>, work: W) -> Vec<UnitOutcome<R>>
    where
        I: Send,
        R: Send,
        W: Fn(I) -> UnitOutcome<R> + Sync,
    {
        let mut outcomes = Vec::with_capacity(items.len());
        self.run_each(items, work, |_, outcome| outcomes.push(outcome));
        outcomes
    }
}

/// Runs one pool unit, tagging any panic log with the pool and unit index.
fn run_unit<I, R, W>(pool: &str, index: usize, work: &W, item: I) -> UnitOutcome<R>
where
    W: Fn(I) -> UnitOutcome<R>,
{
    let _span = tracing::debug_span!("unit", pool, index).entered();
    guarded(|| work(item))
}

/// Runs `unit` behind a panic boundary. A panic is logged and becomes
/// [`UnitOutcome::Failed`]; it never unwinds into the caller.
pub fn guarded<R, F>(unit: F) -> UnitOutcome<R>
where
    F: FnOnce() -> UnitOutcome<R>,
{
    match panic::catch_unwind(AssertUnwindSafe(unit)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("unit panicked: {}", message);
            UnitOutcome::Failed(format!("panicked: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
