//! Data model: API response shapes, backed-up records, scoreboard rows.

pub mod api;
mod record;
mod scoreboard;

pub use api::{value_text, EntityStub};
pub use record::{
    Attachment, Award, ChallengeRecord, ChallengeSolve, Entity, Member, Solve, TeamRecord,
    UserRecord, NOT_AVAILABLE, UNKNOWN,
};
pub use scoreboard::{rank_members, RankedMember, ScoreboardEntry, ScoreboardMember};
