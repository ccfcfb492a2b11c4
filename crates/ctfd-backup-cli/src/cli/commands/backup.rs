//! `ctfd-backup backup` – run a full backup.

use anyhow::{Context, Result};
use clap::Args;
use ctfd_backup_core::config::{
    self, CategorySelection, PartialPagePolicy, Settings, SolvesPolicy,
};
use ctfd_backup_core::{BackupConfig, Orchestrator, RunReport};
use std::path::PathBuf;
use std::time::Duration;

/// Conventional exit code after SIGINT.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Args)]
pub struct BackupArgs {
    /// CTFd instance URL, e.g. https://ctf.example.com.
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: String,

    /// Value of the `session` cookie of a logged-in account.
    #[arg(short = 's', long, value_name = "COOKIE")]
    pub session: Option<String>,

    /// CTF name used for the backup directory (default: detected from the page title).
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: Option<String>,

    /// Directory in which `{name}_backup` is created.
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Skip challenges.
    #[arg(long)]
    pub no_chal: bool,

    /// Skip teams.
    #[arg(long)]
    pub no_team: bool,

    /// Skip users.
    #[arg(long)]
    pub no_user: bool,

    /// Skip the scoreboard.
    #[arg(long)]
    pub no_scoreboard: bool,

    /// Back up challenges only.
    #[arg(long, conflicts_with_all = ["no_chal", "no_team", "no_user", "no_scoreboard"])]
    pub only_chal: bool,

    /// Concurrent challenge workers (1-50).
    #[arg(long, value_name = "N")]
    pub max_workers_chal: Option<usize>,

    /// Concurrent team/user workers (1-50).
    #[arg(long, value_name = "N")]
    pub max_workers_team: Option<usize>,

    /// Concurrent attachment downloads per challenge (1-20).
    #[arg(long, value_name = "N")]
    pub max_workers_file: Option<usize>,

    /// API request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub api_timeout: Option<u64>,

    /// Attachment stall timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub file_timeout: Option<u64>,

    /// What to do when a list fails after the first page: keep or discard.
    #[arg(long, value_name = "POLICY")]
    pub partial_pages: Option<PartialPagePolicy>,

    /// Back up teams and users that have no solves.
    #[arg(long)]
    pub allow_empty_solves: bool,
}

impl BackupArgs {
    /// Layers the flags over the settings file.
    pub fn into_config(self, settings: &Settings) -> BackupConfig {
        let mut cfg = BackupConfig::new(&self.url, self.output, settings);
        cfg.session = self.session.filter(|s| !s.is_empty());
        cfg.ctf_name = self.name.filter(|n| !n.trim().is_empty());

        cfg.categories = if self.only_chal {
            CategorySelection::only_challenges()
        } else {
            CategorySelection {
                scoreboard: !self.no_scoreboard,
                challenges: !self.no_chal,
                teams: !self.no_team,
                users: !self.no_user,
            }
        };

        if let Some(n) = self.max_workers_chal {
            cfg.workers.challenges = n;
        }
        if let Some(n) = self.max_workers_team {
            cfg.workers.participants = n;
        }
        if let Some(n) = self.max_workers_file {
            cfg.workers.files = n;
        }
        if let Some(secs) = self.api_timeout {
            cfg.timeouts.api = Duration::from_secs(secs);
        }
        if let Some(secs) = self.file_timeout {
            cfg.timeouts.file = Duration::from_secs(secs);
        }
        if let Some(policy) = self.partial_pages {
            cfg.partial_pages = policy;
        }
        if self.allow_empty_solves {
            cfg.solves_policy = SolvesPolicy::AllowEmpty;
        }
        cfg
    }
}

/// Runs the backup on a blocking thread while watching for Ctrl-C.
/// Returns 0 when the run finishes and [`EXIT_INTERRUPTED`] on Ctrl-C.
pub async fn run_backup(args: BackupArgs) -> Result<i32> {
    let settings = config::load_or_init()?;
    tracing::debug!("loaded settings: {:?}", settings);

    let orchestrator = Orchestrator::new(args.into_config(&settings))?;
    let cfg = orchestrator.config();
    tracing::info!(
        url = %cfg.base_url,
        chal_workers = cfg.workers.challenges,
        team_workers = cfg.workers.participants,
        file_workers = cfg.workers.files,
        "starting backup"
    );

    let task = tokio::task::spawn_blocking(move || orchestrator.run());
    tokio::select! {
        joined = task => {
            let report = joined.context("backup thread failed")??;
            print_summary(&report);
            Ok(0)
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::warn!("interrupted; files written so far are left in place");
            Ok(EXIT_INTERRUPTED)
        }
    }
}

fn print_summary(report: &RunReport) {
    println!("Backup written to {}", report.root.display());
    for category in &report.categories {
        println!("  {}", category);
    }
    if !report.is_complete() {
        tracing::warn!("some categories were aborted; see the log for details");
    }
}
