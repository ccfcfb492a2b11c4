use std::borrow::Cow;
use std::collections::HashSet;
use url::Url;

use crate::client::ApiClient;
use crate::layout::{entity_folder, sanitize_segment};
use crate::model::api::{ChallengeDetail, ChallengeSolveEntry};
use crate::model::{value_text, Attachment, ChallengeRecord, ChallengeSolve, EntityStub, NOT_AVAILABLE, UNKNOWN};
use crate::pool::{SkipReason, UnitOutcome};

const UNCATEGORIZED: &str = "Uncategorized";

/// Fetches one challenge and its solve list. Attachments are listed, not
/// downloaded.
pub fn fetch_challenge(client: &ApiClient, stub: &EntityStub) -> UnitOutcome<ChallengeRecord> {
    let detail: ChallengeDetail = match client.fetch(&format!("/api/v1/challenges/{}", stub.id)) {
        Ok(detail) => detail,
        Err(e) => return UnitOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
    };
    let solves = fetch_challenge_solves(client, stub.id);
    let mut files: Vec<Attachment> = detail
        .files
        .iter()
        .filter_map(|link| {
            let attachment = attachment_from_link(client.base_url(), link);
            if attachment.is_none() {
                tracing::debug!(id = stub.id, link = %link, "unusable attachment link");
            }
            attachment
        })
        .collect();
    dedupe_file_names(&mut files);

    let category = detail
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    UnitOutcome::Done(ChallengeRecord {
        id: detail.id,
        folder_name: entity_folder(&detail.name, detail.id),
        name: detail.name,
        category: sanitize_segment(&category),
        value: detail.value.unwrap_or(0),
        author: detail.author.unwrap_or_else(|| UNKNOWN.to_string()),
        description: detail.description.unwrap_or_default(),
        solve_count: detail.solves,
        solves,
        files,
    })
}

/// Challenge solves are informational; an unavailable list means no solves.
fn fetch_challenge_solves(client: &ApiClient, id: u64) -> Vec<ChallengeSolve> {
    let endpoint = format!("/api/v1/challenges/{}/solves", id);
    match client.fetch::<Vec<ChallengeSolveEntry>>(&endpoint) {
        Ok(entries) => entries
            .into_iter()
            .map(|entry| ChallengeSolve {
                solver: entry
                    .name
                    .or_else(|| value_text(&entry.user))
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                date: entry.date.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            })
            .collect(),
        Err(e) => {
            tracing::warn!(id, "challenge solves unavailable: {}", e);
            Vec::new()
        }
    }
}

/// Resolves an attachment link (usually `/files/<hash>/<name>?token=...`)
/// against `base_url`. The query and fragment are dropped; the local name is
/// the last path segment, percent-decoded and sanitized.
pub fn attachment_from_link(base_url: &str, link: &str) -> Option<Attachment> {
    let path = link.split(['?', '#']).next().unwrap_or_default().trim();
    if path.is_empty() {
        return None;
    }
    let absolute = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    };
    let url = Url::parse(&absolute).ok()?;
    let last = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(last).unwrap_or(Cow::Borrowed(last));
    let name = sanitize_segment(&decoded);
    Some(Attachment {
        name,
        url: url.to_string(),
        download: None,
    })
}

/// Renames attachments whose local name an earlier attachment already took:
/// `flag.txt`, `flag_2.txt`, `flag_3.txt`. All attachments of a challenge
/// share one directory.
fn dedupe_file_names(files: &mut [Attachment]) {
    let mut taken: HashSet<String> = HashSet::with_capacity(files.len());
    for file in files.iter_mut() {
        if taken.insert(file.name.clone()) {
            continue;
        }
        let (stem, ext) = split_extension(&file.name);
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}_{}{}", stem, n, ext);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        tracing::debug!(from = %file.name, to = %renamed, "duplicate attachment name");
        taken.insert(renamed.clone());
        file.name = renamed;
    }
}

/// Splits at the first dot after the first character, so `a.tar.gz` keeps
/// `.tar.gz` and `.hidden` has no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((i, _)) => name.split_at(i),
        None => (name, ""),
    }
}
