//! Workspace - import path to disk mapping.
//!
//! Every package, first party or third party, lives at
//! `<workspace>/src/<import path>`.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Name of the directory holding package sources inside a workspace.
pub const SOURCE_DIR: &str = "src";

/// Errors mapping a disk path back to an import path.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("path {path} is not inside workspace source dir {src}")]
    OutsideSource { path: PathBuf, src: PathBuf },

    #[error("path {path} is not valid unicode")]
    NonUnicode { path: PathBuf },
}

/// A workspace root under which packages are located by import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the bare source directory (`<root>/src`).
    pub fn src_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIR)
    }

    /// On-disk location of an import path. The empty import path maps to
    /// the bare source directory.
    pub fn package_source(&self, import_path: &str) -> PathBuf {
        let mut path = self.src_dir();
        for part in import_path.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path
    }

    /// Import path of an on-disk location.
    pub fn package_name(&self, path: &Path) -> Result<String, WorkspaceError> {
        let src = self.src_dir();
        let rel = path
            .strip_prefix(&src)
            .map_err(|_| WorkspaceError::OutsideSource {
                path: path.to_path_buf(),
                src: src.clone(),
            })?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| WorkspaceError::NonUnicode {
                        path: path.to_path_buf(),
                    })?;
                    parts.push(part);
                }
                Component::CurDir => {}
                _ => {
                    return Err(WorkspaceError::OutsideSource {
                        path: path.to_path_buf(),
                        src,
                    })
                }
            }
        }
        Ok(parts.join("/"))
    }

    /// Check whether a path is the bare source directory.
    pub fn is_src_dir(&self, path: &Path) -> bool {
        path == self.src_dir()
    }
}

/// Check whether `import_path` is `root` or lies beneath it.
pub fn import_path_contains(root: &str, import_path: &str) -> bool {
    let root = root.trim_end_matches('/');
    match import_path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || root.is_empty(),
        None => false,
    }
}
