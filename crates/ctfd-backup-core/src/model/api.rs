//! Shapes of the CTFd API responses, as far as the backup reads them.
//!
//! Everything except ids is optional with a default: CTFd omits or nulls
//! fields depending on visibility settings and version.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `null` as the type's default.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Renders a loosely typed JSON value (string, number, `{name: ..}` object)
/// as display text.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("name").and_then(value_text),
        Value::Array(_) => None,
    }
}

/// Entry of a paginated list endpoint; only seeds the detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityStub {
    pub id: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub solves: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Attachment links, relative to the base URL and usually carrying a `?token=` query.
    #[serde(default, deserialize_with = "null_default")]
    pub files: Vec<String>,
}

/// Entry of `/api/v1/challenges/{id}/solves`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeSolveEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user: Value,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolvedChallenge {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
}

/// Entry of `/api/v1/{teams,users}/{id}/solves`.
#[derive(Debug, Clone, Deserialize)]
pub struct SolveEntry {
    #[serde(default, deserialize_with = "null_default")]
    pub challenge: SolvedChallenge,
    #[serde(default)]
    pub challenge_id: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user: Value,
}

/// Entry of `/api/v1/{teams,users}/{id}/awards`.
#[derive(Debug, Clone, Deserialize)]
pub struct AwardEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamDetail {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub place: Value,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub bracket: Value,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Member user ids.
    #[serde(default, deserialize_with = "null_default")]
    pub members: Vec<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub fields: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDetail {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub place: Value,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub bracket: Value,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub team: Value,
    #[serde(default, deserialize_with = "null_default")]
    pub fields: Vec<Value>,
}
