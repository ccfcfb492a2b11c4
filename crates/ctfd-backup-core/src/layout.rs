//! Backup directory layout and directory-name sanitization.
//!
//! ```text
//! {root}/Scoreboard/
//! {root}/Challenges/{category}/{challenge_name}/
//! {root}/Teams/{team_name}_{id}/
//! {root}/Users/{user_name}_{id}/
//! ```

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Category;

/// Room left for the `_{id}` suffix under Linux NAME_MAX (255 bytes).
const SEGMENT_MAX: usize = 200;
const EMPTY_SEGMENT: &str = "_";

/// Sanitizes a display name for use as one directory segment.
///
/// - Replaces NUL, `/`, `\`, `: * ? " < > |` and control characters with `_`
/// - Trims leading/trailing whitespace and dots
/// - Limits length to 200 bytes on a char boundary
/// - Falls back to `_` when nothing usable remains
pub fn sanitize_segment(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    let mut take = trimmed.len().min(SEGMENT_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let out = trimmed[..take].trim_end();
    if out.is_empty() {
        EMPTY_SEGMENT.to_string()
    } else {
        out.to_string()
    }
}

/// Directory name of a team or user: `{sanitized_name}_{id}`. Unique per id
/// even when display names collide.
pub fn entity_folder(name: &str, id: u64) -> String {
    format!("{}_{}", sanitize_segment(name), id)
}

/// Percent-encodes a directory name for a relative Markdown link.
pub fn link_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

/// Root of one backup run and the paths beneath it.
#[derive(Debug, Clone)]
pub struct BackupLayout {
    root: PathBuf,
}

impl BackupLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `{output_dir}/{ctf_name}_backup`.
    pub fn for_ctf(output_dir: &Path, ctf_name: &str) -> Self {
        Self::new(output_dir.join(format!("{}_backup", sanitize_segment(ctf_name))))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// Creates the category directory (and the root) if missing.
    pub fn ensure_category(&self, category: Category) -> Result<PathBuf> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(dir)
    }

    /// `Challenges/{category}/{folder}`; both segments must already be sanitized.
    pub fn challenge_dir(&self, category: &str, folder: &str) -> PathBuf {
        self.category_dir(Category::Challenges).join(category).join(folder)
    }

    /// `Teams|Users/{name}_{id}`.
    pub fn entity_dir(&self, category: Category, name: &str, id: u64) -> PathBuf {
        self.category_dir(category).join(entity_folder(name, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_path_hostile_characters() {
        assert_eq!(sanitize_segment("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_segment("web: easy?"), "web_ easy_");
        assert_eq!(sanitize_segment("x\0y"), "x_y");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_segment("  ..  team rocket  .. "), "team rocket");
    }

    #[test]
    fn keeps_underscores_and_unicode() {
        assert_eq!(sanitize_segment("__init__"), "__init__");
        assert_eq!(sanitize_segment("隊伍 🚩"), "隊伍 🚩");
    }

    #[test]
    fn empty_and_reserved_names_fall_back() {
        assert_eq!(sanitize_segment(""), "_");
        assert_eq!(sanitize_segment(".."), "_");
        assert_eq!(sanitize_segment("   "), "_");
    }

    #[test]
    fn long_names_cut_on_char_boundary() {
        let name = "é".repeat(150);
        let out = sanitize_segment(&name);
        assert!(out.len() <= SEGMENT_MAX);
        assert_eq!(out.chars().count(), 100);
    }

    #[test]
    fn entity_folder_disambiguates_by_id() {
        assert_eq!(entity_folder("a/b", 7), "a_b_7");
        assert_ne!(entity_folder("same", 1), entity_folder("same", 2));
    }

    #[test]
    fn link_segment_percent_encodes() {
        assert_eq!(link_segment("team rocket_3"), "team%20rocket_3");
        assert_eq!(link_segment("a#b"), "a%23b");
    }

    #[test]
    fn layout_paths() {
        let layout = BackupLayout::for_ctf(Path::new("/tmp/out"), "My CTF");
        assert_eq!(layout.root(), Path::new("/tmp/out/My CTF_backup"));
        assert_eq!(
            layout.entity_dir(Category::Teams, "a/b", 3),
            Path::new("/tmp/out/My CTF_backup/Teams/a_b_3")
        );
        assert_eq!(
            layout.challenge_dir("web", "login"),
            Path::new("/tmp/out/My CTF_backup/Challenges/web/login")
        );
    }
}
