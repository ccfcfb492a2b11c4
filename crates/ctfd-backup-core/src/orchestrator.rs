//! Runs the enabled categories in order: scoreboard, challenges, teams, users.
//!
//! Categories run one after another; only the entities within a category are
//! processed in parallel. A category that fails outright is logged and
//! reported as aborted, and the run moves on to the next one.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backup::{
    backup_challenges, backup_scoreboard, backup_teams, backup_users, BackupContext, CategoryReport,
    CategoryStatus,
};
use crate::client::ApiClient;
use crate::config::{BackupConfig, Category, ConfigError};
use crate::counters::RunCounters;
use crate::layout::BackupLayout;

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    /// One entry per category, in run order.
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }

    /// True when no enabled category aborted.
    pub fn is_complete(&self) -> bool {
        self.categories
            .iter()
            .all(|r| !matches!(r.status, CategoryStatus::Aborted(_)))
    }
}

#[derive(Debug)]
pub struct Orchestrator {
    config: BackupConfig,
    client: ApiClient,
    counters: RunCounters,
}

impl Orchestrator {
    /// Validates `config` and builds the shared client. Nothing is fetched yet.
    pub fn new(config: BackupConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = ApiClient::new(&config);
        Ok(Self {
            config,
            client,
            counters: RunCounters::new(),
        })
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Backup root: the configured CTF name, else the one detected from the home page.
    pub fn resolve_layout(&self) -> BackupLayout {
        let name = match &self.config.ctf_name {
            Some(name) => name.clone(),
            None => self.client.ctf_name(),
        };
        BackupLayout::for_ctf(&self.config.output_dir, &name)
    }

    /// Runs every enabled category. Errors only when the backup root cannot be created.
    pub fn run(&self) -> Result<RunReport> {
        let layout = self.resolve_layout();
        self.run_into(&layout)
    }

    /// Like [`run`](Self::run), into an already resolved layout.
    pub fn run_into(&self, layout: &BackupLayout) -> Result<RunReport> {
        create_root(layout.root())?;
        tracing::info!("backup root: {}", layout.root().display());

        let ctx = BackupContext {
            client: &self.client,
            config: &self.config,
            layout,
            counters: &self.counters,
        };

        let mut categories = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let report = if self.config.categories.is_enabled(category) {
                self.counters.begin(category);
                tracing::info!(category = category.tag(), "starting {} backup", category.dir_name());
                run_category(&ctx, category)
            } else {
                tracing::debug!(category = category.tag(), "disabled");
                CategoryReport::disabled(category)
            };
            match &report.status {
                CategoryStatus::Aborted(_) => tracing::error!("{}", report),
                CategoryStatus::Completed => tracing::info!("{}", report),
                CategoryStatus::Disabled => {}
            }
            categories.push(report);
        }

        Ok(RunReport {
            root: layout.root().to_path_buf(),
            categories,
        })
    }
}

fn create_root(root: &Path) -> Result<()> {
    fs::create_dir_all(root).with_context(|| format!("failed to create backup root {}", root.display()))
}

fn run_category(ctx: &BackupContext<'_>, category: Category) -> CategoryReport {
    let result = match category {
        Category::Scoreboard => backup_scoreboard(ctx).map(|run| run.report),
        Category::Challenges => backup_challenges(ctx).map(|run| run.report),
        Category::Teams => backup_teams(ctx).map(|run| run.report),
        Category::Users => backup_users(ctx).map(|run| run.report),
    };
    result.unwrap_or_else(|e| CategoryReport::aborted(category, format!("{:#}", e)))
}
