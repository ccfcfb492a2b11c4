use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::ApiClient;
use crate::config::Category;
use crate::download::download_file;
use crate::fetch::fetch_challenge;
use crate::model::{Attachment, ChallengeRecord, EntityStub};
use crate::pool::{UnitOutcome, WorkerPool};
use crate::render::{challenge_description, challenges_index, write_json, write_text};

use super::{list_entities, process_entities, write_index, BackupContext, CategoryRun};

/// Backs up every challenge into `Challenges/{category}/{name}/`, downloading
/// attachments, and writes `Challenges/README.md`.
pub fn backup_challenges(ctx: &BackupContext<'_>) -> Result<CategoryRun<ChallengeRecord>> {
    ctx.layout.ensure_category(Category::Challenges)?;
    let stubs = list_entities(ctx, "/api/v1/challenges")?;

    let mut run = process_entities(ctx, Category::Challenges, ctx.config.workers.challenges, stubs, |stub| {
        back_up_challenge(ctx, stub)
    });

    run.summary.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(a.value.cmp(&b.value))
            .then_with(|| a.name.cmp(&b.name))
    });
    write_index(ctx, Category::Challenges, &challenges_index(run.summary.records()));
    Ok(run)
}

fn back_up_challenge(ctx: &BackupContext<'_>, stub: &EntityStub) -> UnitOutcome<ChallengeRecord> {
    fetch_challenge(ctx.client, stub).and_then(|mut challenge| {
        tracing::info!(
            category = Category::Challenges.tag(),
            "{} | {} | {} pts",
            challenge.name,
            challenge.category,
            challenge.value
        );
        let result = write_challenge(ctx, &mut challenge).map(|()| challenge);
        UnitOutcome::from(result)
    })
}

fn write_challenge(ctx: &BackupContext<'_>, challenge: &mut ChallengeRecord) -> Result<()> {
    let dir = ctx.layout.challenge_dir(&challenge.category, &challenge.folder_name);
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    download_attachments(ctx.client, ctx.config.workers.files, &dir, &mut challenge.files);

    write_text(&dir.join("description.md"), &challenge_description(challenge))?;
    write_json(&dir.join("challenge.json"), challenge)?;
    Ok(())
}

/// Downloads a challenge's attachments on a pool of its own, sized
/// `min(cap, attachments)`. Failures stay in each attachment's report.
fn download_attachments(client: &ApiClient, cap: usize, dir: &Path, files: &mut [Attachment]) {
    if files.is_empty() {
        return;
    }
    tracing::info!(dir = %dir.display(), "{} attachments", files.len());

    let jobs: Vec<(String, PathBuf)> = files
        .iter()
        .map(|f| (f.url.clone(), dir.join(&f.name)))
        .collect();
    let pool = WorkerPool::new("file", cap.min(jobs.len()));
    pool.run_each(
        jobs,
        |(url, dest)| UnitOutcome::Done(download_file(client, &url, &dest)),
        |index, outcome| {
            if let Some(report) = outcome.done() {
                files[index].download = Some(report);
            }
        },
    );
}
