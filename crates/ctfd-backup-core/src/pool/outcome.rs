//! Tagged result of one unit of work.

use thiserror::Error;

/// Why an entity produced no record. Skips are expected per-entity outcomes,
/// never run failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("detail unavailable: {0}")]
    DetailUnavailable(String),
    #[error("solves unavailable: {0}")]
    SolvesUnavailable(String),
    #[error("no solves")]
    NoSolves,
}

/// Result of one unit, delivered to the pool's caller.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome<T> {
    /// Fully processed; the record was written.
    Done(T),
    /// Intentionally not backed up (missing required data).
    Skipped(SkipReason),
    /// Unexpected failure inside the unit (I/O error, panic), already logged.
    Failed(String),
}

impl<T> UnitOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, UnitOutcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            UnitOutcome::Done(value) => Some(value),
            _ => None,
        }
    }

    /// Chains a further step onto a successful outcome.
    pub fn and_then<U, F>(self, f: F) -> UnitOutcome<U>
    where
        F: FnOnce(T) -> UnitOutcome<U>,
    {
        match self {
            UnitOutcome::Done(value) => f(value),
            UnitOutcome::Skipped(reason) => UnitOutcome::Skipped(reason),
            UnitOutcome::Failed(error) => UnitOutcome::Failed(error),
        }
    }
}

impl<T> From<anyhow::Result<T>> for UnitOutcome<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => UnitOutcome::Done(value),
            Err(e) => UnitOutcome::Failed(format!("{:#}", e)),
        }
    }
}
