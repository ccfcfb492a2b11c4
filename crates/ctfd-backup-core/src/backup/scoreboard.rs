use anyhow::{Context, Result};

use crate::config::Category;
use crate::model::{rank_members, ScoreboardEntry};
use crate::render::{team_ranking, user_ranking, write_json, write_text};

use super::{BackupContext, CategoryReport, CategoryRun, CategoryStatus, CategorySummary};

const ENDPOINT: &str = "/api/v1/scoreboard";

/// Writes the team ranking and the flattened member ranking under `Scoreboard/`.
pub fn backup_scoreboard(ctx: &BackupContext<'_>) -> Result<CategoryRun<ScoreboardEntry>> {
    let dir = ctx.layout.ensure_category(Category::Scoreboard)?;
    let entries: Vec<ScoreboardEntry> = ctx
        .client
        .fetch(ENDPOINT)
        .with_context(|| format!("{} unavailable", ENDPOINT))?;
    tracing::info!(category = Category::Scoreboard.tag(), "found {} teams", entries.len());

    write_json(&dir.join("team_ranking.json"), &entries)?;
    write_text(&dir.join("TEAM_RANKING.md"), &team_ranking(&entries))?;

    let members = rank_members(&entries);
    write_json(&dir.join("user_ranking.json"), &members)?;
    write_text(&dir.join("USER_RANKING.md"), &user_ranking(&members))?;
    tracing::info!(
        category = Category::Scoreboard.tag(),
        "rankings written ({} teams, {} members)",
        entries.len(),
        members.len()
    );

    let mut summary = CategorySummary::default();
    for entry in entries {
        summary.push(entry);
    }
    Ok(CategoryRun {
        report: CategoryReport {
            category: Category::Scoreboard,
            status: CategoryStatus::Completed,
            listed: summary.len(),
            processed: summary.len(),
            failed: 0,
        },
        summary,
    })
}
