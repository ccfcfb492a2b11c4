//! Per-category backups.
//!
//! Each category lists its entities, fans them out over a [`WorkerPool`],
//! and builds its index from the collected records once every worker has
//! finished. A worker fetches one entity, writes its files and updates the
//! shared [`RunCounters`] before handing the record back.

mod challenges;
mod scoreboard;
mod teams;
mod users;

pub use challenges::backup_challenges;
pub use scoreboard::backup_scoreboard;
pub use teams::backup_teams;
pub use users::backup_users;

use serde::Serialize;
use std::fmt;

use crate::client::ApiClient;
use crate::config::{BackupConfig, Category};
use crate::counters::RunCounters;
use crate::layout::BackupLayout;
use crate::model::EntityStub;
use crate::paginate::fetch_all_pages;
use crate::pool::{guarded, UnitOutcome, WorkerPool};

/// Everything a category backup reads. Shared by reference with all workers.
#[derive(Debug, Clone, Copy)]
pub struct BackupContext<'a> {
    pub client: &'a ApiClient,
    pub config: &'a BackupConfig,
    pub layout: &'a BackupLayout,
    pub counters: &'a RunCounters,
}

/// How a category's run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum CategoryStatus {
    Disabled,
    Completed,
    /// Category-level failure (list unreachable, output not writable).
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub status: CategoryStatus,
    /// Entities returned by the list endpoint.
    pub listed: usize,
    pub processed: usize,
    pub failed: usize,
}

impl CategoryReport {
    pub fn disabled(category: Category) -> Self {
        Self::empty(category, CategoryStatus::Disabled)
    }

    pub fn aborted(category: Category, reason: impl Into<String>) -> Self {
        Self::empty(category, CategoryStatus::Aborted(reason.into()))
    }

    fn empty(category: Category, status: CategoryStatus) -> Self {
        Self {
            category,
            status,
            listed: 0,
            processed: 0,
            failed: 0,
        }
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            CategoryStatus::Disabled => write!(f, "{}: disabled", self.category),
            CategoryStatus::Aborted(reason) => write!(f, "{}: aborted ({})", self.category, reason),
            CategoryStatus::Completed => write!(
                f,
                "{}: {}/{} backed up, {} skipped",
                self.category, self.processed, self.listed, self.failed
            ),
        }
    }
}

/// Successfully backed-up records of one category, in completion order
/// until [`sort_by`](Self::sort_by) is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary<T> {
    records: Vec<T>,
}

impl<T> Default for CategorySummary<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T> CategorySummary<T> {
    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.records.sort_by(compare);
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

/// Result of one category backup.
#[derive(Debug, Clone)]
pub struct CategoryRun<T> {
    pub report: CategoryReport,
    pub summary: CategorySummary<T>,
}

/// Fetches every page of a list endpoint, applying the partial-page policy.
pub(crate) fn list_entities(ctx: &BackupContext<'_>, endpoint: &str) -> anyhow::Result<Vec<EntityStub>> {
    fetch_all_pages::<EntityStub>(ctx.client, endpoint)
        .into_items(endpoint, ctx.config.partial_pages)
        .ok_or_else(|| anyhow::anyhow!("{} unavailable", endpoint))
}

/// Runs `unit` for every stub on a pool of `cap` workers. Each worker records
/// its own outcome in the run counters; done records are collected in
/// completion order.
pub(crate) fn process_entities<T, U>(
    ctx: &BackupContext<'_>,
    category: Category,
    cap: usize,
    stubs: Vec<EntityStub>,
    unit: U,
) -> CategoryRun<T>
where
    T: Send,
    U: Fn(&EntityStub) -> UnitOutcome<T> + Sync,
{
    let total = stubs.len();
    let pool = WorkerPool::new(category.tag(), cap.min(total));
    tracing::info!(category = category.tag(), "found {} entries, {} workers", total, pool.cap());

    let counters = ctx.counters;
    let mut summary = CategorySummary::default();
    pool.run_each(
        stubs,
        |stub| {
            let outcome = guarded(|| unit(&stub));
            match &outcome {
                UnitOutcome::Done(_) => {
                    counters.record_success(total);
                }
                UnitOutcome::Skipped(reason) => {
                    counters.record_failure(&label(&stub), reason);
                }
                UnitOutcome::Failed(error) => {
                    counters.record_failure(&label(&stub), error);
                }
            }
            outcome
        },
        |_, outcome| {
            if let UnitOutcome::Done(record) = outcome {
                summary.push(record);
            }
        },
    );

    let counts = counters.snapshot();
    CategoryRun {
        report: CategoryReport {
            category,
            status: CategoryStatus::Completed,
            listed: total,
            processed: counts.processed,
            failed: counts.failed,
        },
        summary,
    }
}

fn label(stub: &EntityStub) -> String {
    if stub.name.is_empty() {
        format!("ID:{}", stub.id)
    } else {
        format!("{} (ID:{})", stub.name, stub.id)
    }
}

/// Writes a category index, logging instead of failing: the entity files are
/// already on disk.
pub(crate) fn write_index(ctx: &BackupContext<'_>, category: Category, content: &str) {
    let path = ctx.layout.category_dir(category).join("README.md");
    match crate::render::write_text(&path, content) {
        Ok(()) => tracing::info!(category = category.tag(), "index written: {}", path.display()),
        Err(e) => tracing::error!(category = category.tag(), "index not written: {:#}", e),
    }
}

/// Case-insensitive name order with the id as tie-breaker.
pub(crate) fn by_name(a_name: &str, a_id: u64, b_name: &str, b_id: u64) -> std::cmp::Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then(a_id.cmp(&b_id))
}
