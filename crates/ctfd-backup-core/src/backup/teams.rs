use anyhow::{Context, Result};
use std::fs;

use crate::config::Category;
use crate::fetch::fetch_team;
use crate::layout::BackupLayout;
use crate::model::{EntityStub, TeamRecord};
use crate::pool::UnitOutcome;
use crate::render::{team_readme, teams_index, write_json, write_text};

use super::{by_name, list_entities, process_entities, write_index, BackupContext, CategoryRun};

/// Backs up every team into `Teams/{name}_{id}/` and writes `Teams/README.md`.
pub fn backup_teams(ctx: &BackupContext<'_>) -> Result<CategoryRun<TeamRecord>> {
    ctx.layout.ensure_category(Category::Teams)?;
    let stubs = list_entities(ctx, "/api/v1/teams")?;

    let mut run = process_entities(ctx, Category::Teams, ctx.config.workers.participants, stubs, |stub| {
        back_up_team(ctx, stub)
    });

    run.summary.sort_by(|a, b| by_name(&a.name, a.id, &b.name, b.id));
    write_index(ctx, Category::Teams, &teams_index(run.summary.records()));
    Ok(run)
}

fn back_up_team(ctx: &BackupContext<'_>, stub: &EntityStub) -> UnitOutcome<TeamRecord> {
    fetch_team(ctx.client, stub, ctx.config.solves_policy)
        .and_then(|team| UnitOutcome::from(write_team(ctx.layout, &team).map(|()| team)))
}

fn write_team(layout: &BackupLayout, team: &TeamRecord) -> Result<()> {
    let dir = layout.entity_dir(Category::Teams, &team.name, team.id);
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    write_json(&dir.join("team_info.json"), team)?;
    write_text(&dir.join("README.md"), &team_readme(team))?;
    tracing::debug!(id = team.id, name = %team.name, "team written");
    Ok(())
}
