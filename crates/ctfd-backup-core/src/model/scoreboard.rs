//! Scoreboard entries and the flattened member ranking.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::api::null_default;
use super::record::UNKNOWN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardMember {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

/// One row of `/api/v1/scoreboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    #[serde(default)]
    pub pos: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub score: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub members: Vec<ScoreboardMember>,
}

impl ScoreboardEntry {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN)
    }

    /// Score of a member that came without one: a solo team's score is its
    /// member's score, otherwise nothing is known.
    fn fallback_member_score(&self) -> i64 {
        if self.members.len() == 1 {
            self.score
        } else {
            0
        }
    }
}

/// A scoreboard member together with the team it scored for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMember {
    pub name: String,
    pub id: Option<u64>,
    pub score: i64,
    pub team: String,
}

/// Flattens all team members, ordered by score descending. Ties keep
/// scoreboard order.
pub fn rank_members(entries: &[ScoreboardEntry]) -> Vec<RankedMember> {
    let mut members: Vec<RankedMember> = entries
        .iter()
        .flat_map(|team| {
            team.members.iter().map(move |m| RankedMember {
                name: m.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                id: m.id,
                score: m.score.unwrap_or_else(|| team.fallback_member_score()),
                team: team.display_name().to_string(),
            })
        })
        .collect();
    members.sort_by(|a, b| b.score.cmp(&a.score));
    members
}
