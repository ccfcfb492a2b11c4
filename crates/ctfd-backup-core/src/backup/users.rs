use anyhow::{Context, Result};
use std::fs;

use crate::config::Category;
use crate::fetch::fetch_user;
use crate::layout::BackupLayout;
use crate::model::{EntityStub, UserRecord};
use crate::pool::UnitOutcome;
use crate::render::{user_readme, users_index, write_json, write_text};

use super::{by_name, list_entities, process_entities, write_index, BackupContext, CategoryRun};

/// Backs up every user into `Users/{name}_{id}/` and writes `Users/README.md`.
pub fn backup_users(ctx: &BackupContext<'_>) -> Result<CategoryRun<UserRecord>> {
    ctx.layout.ensure_category(Category::Users)?;
    let stubs = list_entities(ctx, "/api/v1/users")?;

    let mut run = process_entities(ctx, Category::Users, ctx.config.workers.participants, stubs, |stub| {
        back_up_user(ctx, stub)
    });

    run.summary.sort_by(|a, b| by_name(&a.name, a.id, &b.name, b.id));
    write_index(ctx, Category::Users, &users_index(run.summary.records()));
    Ok(run)
}

fn back_up_user(ctx: &BackupContext<'_>, stub: &EntityStub) -> UnitOutcome<UserRecord> {
    fetch_user(ctx.client, stub, ctx.config.solves_policy)
        .and_then(|user| UnitOutcome::from(write_user(ctx.layout, &user).map(|()| user)))
}

fn write_user(layout: &BackupLayout, user: &UserRecord) -> Result<()> {
    let dir = layout.entity_dir(Category::Users, &user.name, user.id);
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    write_json(&dir.join("user_info.json"), user)?;
    write_text(&dir.join("README.md"), &user_readme(user))?;
    tracing::debug!(id = user.id, name = %user.name, "user written");
    Ok(())
}
