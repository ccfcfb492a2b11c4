pub mod config;
pub mod logging;

pub mod backup;
pub mod client;
pub mod counters;
pub mod download;
pub mod fetch;
pub mod layout;
pub mod model;
pub mod orchestrator;
pub mod paginate;
pub mod pool;
pub mod render;

pub use config::BackupConfig;
pub use orchestrator::{Orchestrator, RunReport};
