//! Declared dependencies.
//!
//! A project pins a subtree of import paths to a repository source and/or
//! revision. Pins are read-only input to the fetch driver and the sources
//! resolver.

use serde::{Deserialize, Serialize};

use crate::core::workspace::import_path_contains;

/// A project's explicit pin for a subtree of import paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    /// Import path prefix governed by this pin
    pub root: String,

    /// Revision to check out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Remote source to fetch from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl DeclaredDependency {
    pub fn new(root: impl Into<String>) -> Self {
        DeclaredDependency {
            root: root.into(),
            revision: None,
            source: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Check whether this pin governs an import path.
    pub fn governs(&self, import_path: &str) -> bool {
        import_path_contains(&self.root, import_path)
    }
}

/// Find the first pin governing an import path.
pub fn declared_for<'a>(
    declared: &'a [DeclaredDependency],
    import_path: &str,
) -> Option<&'a DeclaredDependency> {
    declared.iter().find(|pin| pin.governs(import_path))
}
