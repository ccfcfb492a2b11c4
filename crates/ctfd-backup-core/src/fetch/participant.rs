//! Team and user fetchers.

use crate::client::ApiClient;
use crate::config::SolvesPolicy;
use crate::model::api::{TeamDetail, UserDetail};
use crate::model::{value_text, EntityStub, Member, TeamRecord, UserRecord, NOT_AVAILABLE, UNKNOWN};
use crate::pool::{SkipReason, UnitOutcome};

use super::{fetch_awards, fetch_solves, Participant};

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Detail name, else the listing name, else `{prefix}_{id}`.
fn display_name(detail: Option<String>, stub: &EntityStub, prefix: &str) -> String {
    detail
        .filter(|n| !n.trim().is_empty())
        .or_else(|| Some(stub.name.clone()).filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| format!("{}_{}", prefix, stub.id))
}

/// Resolves member ids one by one; members whose lookup fails are omitted.
fn resolve_members(client: &ApiClient, ids: &[u64]) -> Vec<Member> {
    ids.iter()
        .filter_map(|&id| match client.fetch::<UserDetail>(&format!("/api/v1/users/{}", id)) {
            Ok(user) => Some(Member {
                name: user.name.unwrap_or_else(|| UNKNOWN.to_string()),
                id,
                score: user.score.unwrap_or(0),
            }),
            Err(e) => {
                tracing::debug!(member = id, "member lookup failed: {}", e);
                None
            }
        })
        .collect()
}

/// Fetches one team: detail, solves, members, awards.
pub fn fetch_team(client: &ApiClient, stub: &EntityStub, policy: SolvesPolicy) -> UnitOutcome<TeamRecord> {
    let detail: TeamDetail = match client.fetch(&format!("/api/v1/teams/{}", stub.id)) {
        Ok(detail) => detail,
        Err(e) => return UnitOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
    };
    let solves = match fetch_solves(client, Participant::Team, stub.id, policy) {
        Ok(solves) => solves,
        Err(reason) => return UnitOutcome::Skipped(reason),
    };
    let members = resolve_members(client, &detail.members);
    let awards = fetch_awards(client, Participant::Team, stub.id);

    UnitOutcome::Done(TeamRecord {
        id: stub.id,
        name: display_name(detail.name, stub, "Team"),
        rank: value_text(&detail.place).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        score: detail.score.unwrap_or(0),
        bracket: value_text(&detail.bracket).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        country: or_na(detail.country),
        affiliation: or_na(detail.affiliation),
        website: or_na(detail.website),
        members,
        solves,
        awards,
        fields: detail.fields,
    })
}

/// Fetches one user: detail, solves, awards.
pub fn fetch_user(client: &ApiClient, stub: &EntityStub, policy: SolvesPolicy) -> UnitOutcome<UserRecord> {
    let detail: UserDetail = match client.fetch(&format!("/api/v1/users/{}", stub.id)) {
        Ok(detail) => detail,
        Err(e) => return UnitOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
    };
    let solves = match fetch_solves(client, Participant::User, stub.id, policy) {
        Ok(solves) => solves,
        Err(reason) => return UnitOutcome::Skipped(reason),
    };
    let awards = fetch_awards(client, Participant::User, stub.id);

    UnitOutcome::Done(UserRecord {
        id: stub.id,
        name: display_name(detail.name, stub, "User"),
        rank: value_text(&detail.place).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        score: detail.score.unwrap_or(0),
        bracket: value_text(&detail.bracket).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        country: or_na(detail.country),
        affiliation: or_na(detail.affiliation),
        website: or_na(detail.website),
        team_id: detail.team_id,
        team_name: value_text(&detail.team),
        solves,
        awards,
        fields: detail.fields,
    })
}
