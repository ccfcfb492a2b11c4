//! Run configuration: tunables from `~/.config/ctfd-backup/config.toml` plus
//! the per-run values supplied by the CLI.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const MAX_ENTITY_WORKERS: usize = 50;
pub const MAX_FILE_WORKERS: usize = 20;

/// What to do when a list endpoint fails after at least one page was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialPagePolicy {
    /// Keep the pages gathered so far and log a warning naming the failed page.
    #[default]
    Keep,
    /// Treat the whole list as unavailable.
    Discard,
}

impl FromStr for PartialPagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "discard" => Ok(Self::Discard),
            other => Err(format!("unknown partial-page policy {other:?} (expected keep or discard)")),
        }
    }
}

/// How a team or user without solves is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolvesPolicy {
    /// An empty or unavailable solves list skips the entity.
    #[default]
    Required,
    /// An empty solves list still produces a record; a failed fetch skips.
    AllowEmpty,
}

impl FromStr for SolvesPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "allow-empty" | "allow_empty" => Ok(Self::AllowEmpty),
            other => Err(format!(
                "unknown solves policy {other:?} (expected required or allow-empty)"
            )),
        }
    }
}

/// Tunables loaded from `config.toml`. CLI flags override individual values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Challenges processed concurrently.
    pub max_workers_challenges: usize,
    /// Teams or users processed concurrently.
    pub max_workers_teams: usize,
    /// Attachments downloaded concurrently per challenge.
    pub max_workers_files: usize,
    /// API request timeout in seconds.
    pub api_timeout_secs: u64,
    /// Attachment transfer timeout in seconds.
    pub file_timeout_secs: u64,
    pub partial_pages: PartialPagePolicy,
    pub solves_policy: SolvesPolicy,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_workers_challenges: 10,
            max_workers_teams: 20,
            max_workers_files: 5,
            api_timeout_secs: 15,
            file_timeout_secs: 60,
            partial_pages: PartialPagePolicy::Keep,
            solves_policy: SolvesPolicy::Required,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ctfd-backup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load settings from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Settings> {
    let path = config_path()?;
    if !path.exists() {
        let default_settings = Settings::default();
        let toml = toml::to_string_pretty(&default_settings)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_settings);
    }

    let data = fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&data)?;
    Ok(settings)
}

/// The four backup categories, in the order the orchestrator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scoreboard,
    Challenges,
    Teams,
    Users,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Scoreboard,
        Category::Challenges,
        Category::Teams,
        Category::Users,
    ];

    /// Directory name under the backup root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Scoreboard => "Scoreboard",
            Category::Challenges => "Challenges",
            Category::Teams => "Teams",
            Category::Users => "Users",
        }
    }

    /// Short tag used in log lines.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Scoreboard => "scoreboard",
            Category::Challenges => "chal",
            Category::Teams => "team",
            Category::Users => "user",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which categories a run backs up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySelection {
    pub scoreboard: bool,
    pub challenges: bool,
    pub teams: bool,
    pub users: bool,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self {
            scoreboard: true,
            challenges: true,
            teams: true,
            users: true,
        }
    }
}

impl CategorySelection {
    pub fn only_challenges() -> Self {
        Self {
            scoreboard: false,
            challenges: true,
            teams: false,
            users: false,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Scoreboard => self.scoreboard,
            Category::Challenges => self.challenges,
            Category::Teams => self.teams,
            Category::Users => self.users,
        }
    }
}

/// Concurrency caps. `files` is per challenge and nests inside `challenges`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerLimits {
    pub challenges: usize,
    pub participants: usize,
    pub files: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub api: Duration,
    pub file: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{name} must be between 1 and {max} (got {value})")]
    WorkersOutOfRange {
        name: &'static str,
        value: usize,
        max: usize,
    },
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Immutable parameters for one backup run.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// CTFd instance URL, without a trailing slash.
    pub base_url: String,
    /// Value of the `session` cookie, if authenticated.
    pub session: Option<String>,
    /// Overrides the name detected from the home page title.
    pub ctf_name: Option<String>,
    /// Parent of the `{ctf_name}_backup` directory.
    pub output_dir: PathBuf,
    pub categories: CategorySelection,
    pub workers: WorkerLimits,
    pub timeouts: Timeouts,
    pub partial_pages: PartialPagePolicy,
    pub solves_policy: SolvesPolicy,
    pub user_agent: String,
}

impl BackupConfig {
    /// Build a config for `base_url` with every tunable taken from `settings`.
    pub fn new(base_url: &str, output_dir: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
            ctf_name: None,
            output_dir: output_dir.into(),
            categories: CategorySelection::default(),
            workers: WorkerLimits {
                challenges: settings.max_workers_challenges,
                participants: settings.max_workers_teams,
                files: settings.max_workers_files,
            },
            timeouts: Timeouts {
                api: Duration::from_secs(settings.api_timeout_secs),
                file: Duration::from_secs(settings.file_timeout_secs),
            },
            partial_pages: settings.partial_pages,
            solves_policy: settings.solves_policy,
            user_agent: settings.user_agent.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        check_range("max-workers-chal", self.workers.challenges, MAX_ENTITY_WORKERS)?;
        check_range("max-workers-team", self.workers.participants, MAX_ENTITY_WORKERS)?;
        check_range("max-workers-file", self.workers.files, MAX_FILE_WORKERS)?;
        if self.timeouts.api.is_zero() {
            return Err(ConfigError::ZeroTimeout("api"));
        }
        if self.timeouts.file.is_zero() {
            return Err(ConfigError::ZeroTimeout("file"));
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::WorkersOutOfRange { name, value, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackupConfig {
        BackupConfig::new("https://ctf.example.com/", ".", &Settings::default())
    }

    #[test]
    fn default_settings_values() {
        let s = Settings::default();
        assert_eq!(s.max_workers_challenges, 10);
        assert_eq!(s.max_workers_teams, 20);
        assert_eq!(s.max_workers_files, 5);
        assert_eq!(s.api_timeout_secs, 15);
        assert_eq!(s.file_timeout_secs, 60);
        assert_eq!(s.partial_pages, PartialPagePolicy::Keep);
        assert_eq!(s.solves_policy, SolvesPolicy::Required);
    }

    #[test]
    fn settings_toml_partial_file_uses_defaults() {
        let toml = r#"
            max_workers_files = 2
            partial_pages = "discard"
            solves_policy = "allow-empty"
        "#;
        let s: Settings = toml::from_str(toml).unwrap();
        assert_eq!(s.max_workers_files, 2);
        assert_eq!(s.max_workers_challenges, 10);
        assert_eq!(s.partial_pages, PartialPagePolicy::Discard);
        assert_eq!(s.solves_policy, SolvesPolicy::AllowEmpty);
        assert_eq!(s.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn settings_toml_roundtrip() {
        let s = Settings::default();
        let text = toml::to_string_pretty(&s).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn new_trims_trailing_slash() {
        assert_eq!(config().base_url, "https://ctf.example.com");
        assert!(config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_workers() {
        let mut cfg = config();
        cfg.workers.challenges = 51;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::WorkersOutOfRange {
                name: "max-workers-chal",
                value: 51,
                max: 50
            })
        );
        let mut cfg = config();
        cfg.workers.files = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::WorkersOutOfRange { name: "max-workers-file", .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_url_and_zero_timeout() {
        let mut cfg = config();
        cfg.base_url = "ftp://ctf.example.com".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));
        let mut cfg = config();
        cfg.base_url = "not a url".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));
        let mut cfg = config();
        cfg.timeouts.file = Duration::ZERO;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout("file")));
    }

    #[test]
    fn policies_parse_from_str() {
        assert_eq!("KEEP".parse::<PartialPagePolicy>(), Ok(PartialPagePolicy::Keep));
        assert_eq!("discard".parse::<PartialPagePolicy>(), Ok(PartialPagePolicy::Discard));
        assert!("sometimes".parse::<PartialPagePolicy>().is_err());
        assert_eq!("allow-empty".parse::<SolvesPolicy>(), Ok(SolvesPolicy::AllowEmpty));
        assert_eq!("required".parse::<SolvesPolicy>(), Ok(SolvesPolicy::Required));
    }

    #[test]
    fn only_challenges_selection() {
        let sel = CategorySelection::only_challenges();
        assert!(sel.is_enabled(Category::Challenges));
        assert!(!sel.is_enabled(Category::Teams));
        assert!(!sel.is_enabled(Category::Users));
        assert!(!sel.is_enabled(Category::Scoreboard));
    }
}
