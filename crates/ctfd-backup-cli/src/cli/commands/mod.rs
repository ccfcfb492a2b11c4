//! CLI command handlers.

mod backup;
mod completions;

pub use backup::{run_backup, BackupArgs};
pub use completions::run_completions;
