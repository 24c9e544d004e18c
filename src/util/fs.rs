//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Check if `child` is `parent` or lies beneath it (component-wise).
pub fn path_is_child(parent: &Path, child: &Path) -> bool {
    child.starts_with(parent)
}

/// Check whether a directory entry name is hidden from traversal.
///
/// Names starting with `.` or `_` are ignored by the package tool, so they
/// are never treated as packages.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// List the visible immediate subdirectories of `dir`, sorted.
///
/// Symlinks are not followed.
pub fn visible_sub_directories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", dir.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_str().map_or(true, is_hidden) {
            continue;
        }
        subdirs.push(entry.into_path());
    }

    subdirs.sort();
    Ok(subdirs)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}
