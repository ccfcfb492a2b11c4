//! Entity fetcher: one detail request plus the entity's sub-resources.
//!
//! Sub-resource requests are independent and fail in isolation:
//! - detail unavailable: the entity is skipped
//! - team/user solves unavailable: the entity is skipped (see [`SolvesPolicy`])
//! - awards unavailable: empty awards list
//! - one member lookup unavailable: that member is omitted
//! - challenge solves unavailable: empty solves list
//!
//! Fetchers hold no state between calls; the same responses always produce
//! the same record.

mod challenge;
mod participant;

pub use challenge::{attachment_from_link, fetch_challenge};
pub use participant::{fetch_team, fetch_user};

use crate::client::ApiClient;
use crate::config::SolvesPolicy;
use crate::model::api::{AwardEntry, SolveEntry};
use crate::model::{value_text, Award, Solve, NOT_AVAILABLE, UNKNOWN};
use crate::pool::SkipReason;

/// `teams` or `users`: the path segment of a participant endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Participant {
    Team,
    User,
}

impl Participant {
    pub(crate) fn segment(self) -> &'static str {
        match self {
            Participant::Team => "teams",
            Participant::User => "users",
        }
    }
}

/// Fetches `/api/v1/{teams,users}/{id}/solves`, applying `policy`.
pub(crate) fn fetch_solves(
    client: &ApiClient,
    kind: Participant,
    id: u64,
    policy: SolvesPolicy,
) -> Result<Vec<Solve>, SkipReason> {
    let endpoint = format!("/api/v1/{}/{}/solves", kind.segment(), id);
    let entries: Vec<SolveEntry> = client
        .fetch(&endpoint)
        .map_err(|e| SkipReason::SolvesUnavailable(e.to_string()))?;
    if entries.is_empty() && policy == SolvesPolicy::Required {
        return Err(SkipReason::NoSolves);
    }
    let with_user = kind == Participant::Team;
    Ok(entries.into_iter().map(|e| solve_from_entry(e, with_user)).collect())
}

fn solve_from_entry(entry: SolveEntry, with_user: bool) -> Solve {
    Solve {
        challenge: entry.challenge.name.unwrap_or_else(|| UNKNOWN.to_string()),
        challenge_id: entry.challenge_id,
        category: entry.challenge.category,
        value: entry.challenge.value,
        date: entry.date.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        user: with_user.then(|| value_text(&entry.user).unwrap_or_else(|| UNKNOWN.to_string())),
    }
}

/// Fetches awards; an unavailable endpoint degrades to no awards.
pub(crate) fn fetch_awards(client: &ApiClient, kind: Participant, id: u64) -> Vec<Award> {
    let endpoint = format!("/api/v1/{}/{}/awards", kind.segment(), id);
    match client.fetch::<Vec<AwardEntry>>(&endpoint) {
        Ok(entries) => entries
            .into_iter()
            .map(|a| Award {
                name: a.name.unwrap_or_else(|| UNKNOWN.to_string()),
                value: a.value.unwrap_or(0),
                date: a.date.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            })
            .collect(),
        Err(e) => {
            tracing::debug!(endpoint = %endpoint, "no awards: {}", e);
            Vec::new()
        }
    }
}
