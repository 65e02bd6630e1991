//! Skill discovery inside a tile.

use std::path::{Path, PathBuf};
use tile_core::is_hidden;
use tracing::warn;
use walkdir::WalkDir;

/// File that marks a directory as a skill.
pub const SKILL_FILE: &str = "SKILL.md";

/// Lazily yield every skill directory under `root`.
///
/// Each call starts a fresh filesystem scan. Hidden entries are skipped and
/// symlinks are not followed; order is traversal order.
pub fn discover_skills(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable entry during skill discovery");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == SKILL_FILE)
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
}

/// Whether `root` contains at least one skill.
pub fn has_skills(root: &Path) -> bool {
    discover_skills(root).next().is_some()
}
