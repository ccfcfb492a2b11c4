//! On-disk artifacts: pretty JSON records and Markdown summaries.

mod markdown;

pub use markdown::{
    challenge_description, challenges_index, team_ranking, team_readme, teams_index, user_ranking,
    user_readme, users_index,
};

use anyhow::{Context, Result};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `value` as pretty-printed JSON (non-ASCII kept as is).
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    out.write_all(b"\n")?;
    out.flush().with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Escapes `|` so a display name cannot break a Markdown table row.
pub fn escape_cell(text: &str) -> Cow<'_, str> {
    if text.contains('|') {
        Cow::Owned(text.replace('|', "\\|"))
    } else {
        Cow::Borrowed(text)
    }
}
