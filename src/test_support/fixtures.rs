//! On-disk workspace fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::Workspace;

/// A throwaway workspace in a temp directory.
///
/// Dropping the fixture removes the directory.
pub struct WorkspaceFixture {
    dir: TempDir,
}

impl WorkspaceFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        WorkspaceFixture { dir }
    }

    /// Workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.dir.path())
    }

    /// Create the directory for a package, along with its parents.
    pub fn package(&self, import_path: &str) -> PathBuf {
        let dir = self.workspace().package_source(import_path);
        fs::create_dir_all(&dir).expect("failed to create package dir");
        dir
    }

    /// Put a plain file where a package would live.
    pub fn file(&self, import_path: &str, contents: &str) -> PathBuf {
        let path = self.workspace().package_source(import_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }
}

impl Default for WorkspaceFixture {
    fn default() -> Self {
        Self::new()
    }
}
