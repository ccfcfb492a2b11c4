//! Backed-up records: what gets written to each entity's JSON file and fed to
//! the Markdown renderer. Each is produced by exactly one worker and never
//! mutated after it is written.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::download::DownloadReport;
use crate::layout;

/// Placeholder for fields the platform did not return.
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";

/// A backed-up entity with a stable id and display name.
pub trait Entity {
    fn id(&self) -> u64;
    fn name(&self) -> &str;

    /// Directory name under the category: `{sanitized_name}_{id}`.
    fn folder_name(&self) -> String {
        layout::entity_folder(self.name(), self.id())
    }
}

/// A solve by a team or user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solve {
    pub challenge: String,
    pub challenge_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    pub date: String,
    /// Solving user (team solves only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub name: String,
    pub value: i64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub id: u64,
    pub score: i64,
}

/// A solve listed on a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSolve {
    pub solver: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Local file name: last URL path segment, suffixed when an earlier
    /// attachment of the same challenge already took it.
    pub name: String,
    /// Absolute download URL, without the query string.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<DownloadReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub id: u64,
    pub name: String,
    /// Directory name: `{sanitized_name}_{id}`.
    pub folder_name: String,
    /// Sanitized category used as the parent directory name.
    pub category: String,
    pub value: i64,
    pub author: String,
    pub description: String,
    /// Solve count reported by the challenge detail.
    pub solve_count: Option<i64>,
    pub solves: Vec<ChallengeSolve>,
    pub files: Vec<Attachment>,
}

impl Entity for ChallengeRecord {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn folder_name(&self) -> String {
        self.folder_name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: u64,
    pub name: String,
    pub rank: String,
    pub score: i64,
    pub bracket: String,
    pub country: String,
    pub affiliation: String,
    pub website: String,
    pub members: Vec<Member>,
    pub solves: Vec<Solve>,
    pub awards: Vec<Award>,
    pub fields: Vec<Value>,
}

impl Entity for TeamRecord {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub rank: String,
    pub score: i64,
    pub bracket: String,
    pub country: String,
    pub affiliation: String,
    pub website: String,
    pub team_id: Option<u64>,
    pub team_name: Option<String>,
    pub solves: Vec<Solve>,
    pub awards: Vec<Award>,
    pub fields: Vec<Value>,
}

impl Entity for UserRecord {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
