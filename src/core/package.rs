//! Package reader capability.
//!
//! A package reader inspects one directory and reports the import paths the
//! package there depends on directly. The default implementation shells out
//! to the package tool, see [`crate::sources::GoListReader`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefixes the package tool uses when a directory has no buildable
/// sources. Older releases report the go/build wording, newer ones the
/// cmd/go wording.
const NO_BUILDABLE_PREFIXES: &[&str] = &[
    "no buildable Go",
    "no Go files in",
    "no non-test Go files in",
    "build constraints exclude all Go files in",
];

/// An error reported by the package tool for a single package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[error("{err}")]
pub struct PackageError {
    /// Shortest import chain from the requested package to this one
    #[serde(default)]
    pub import_stack: Vec<String>,

    /// Position of the error
    #[serde(default)]
    pub pos: String,

    /// The error itself
    #[serde(default)]
    pub err: String,
}

impl PackageError {
    pub fn new(err: impl Into<String>) -> Self {
        PackageError {
            err: err.into(),
            ..Default::default()
        }
    }

    /// Check whether this error means the directory holds no buildable
    /// source files, i.e. it is not a package at all.
    pub fn is_no_buildable(&self) -> bool {
        NO_BUILDABLE_PREFIXES
            .iter()
            .any(|prefix| self.err.starts_with(prefix))
    }
}

/// Failure reading a package.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The package tool ran and reported a problem with the package.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// The package tool could not be run or its output understood.
    #[error(transparent)]
    Tool(#[from] anyhow::Error),
}

impl ReadError {
    /// Check whether this is the "no buildable source" package error.
    pub fn is_no_buildable(&self) -> bool {
        matches!(self, ReadError::Package(e) if e.is_no_buildable())
    }
}

/// Result of reading one package directory.
///
/// A reader may find some imports and still report an error, so both are
/// kept rather than collapsing into a `Result`.
#[derive(Debug, Default)]
pub struct PackageImports {
    /// Import paths the package depends on directly
    pub imports: Vec<String>,

    /// Error encountered while reading, if any
    pub error: Option<ReadError>,
}

impl PackageImports {
    pub fn ok(imports: Vec<String>) -> Self {
        PackageImports {
            imports,
            error: None,
        }
    }

    pub fn failed(error: impl Into<ReadError>) -> Self {
        PackageImports {
            imports: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Treat any reported error as a failure.
    pub fn into_result(self) -> Result<Vec<String>, ReadError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.imports),
        }
    }
}

/// Reads the direct imports of the package in a directory.
pub trait PackageReader {
    fn read_imports(&self, dir: &Path) -> PackageImports;
}

impl<R: PackageReader + ?Sized> PackageReader for &R {
    fn read_imports(&self, dir: &Path) -> PackageImports {
        (**self).read_imports(dir)
    }
}

/// Check whether an import path names a remote package: not a local
/// import, at least two path segments, and a domain-like first segment.
/// Standard library imports never qualify.
pub fn is_remote(import_path: &str) -> bool {
    if is_local_import(import_path) {
        return false;
    }

    let mut parts = import_path.split('/');
    let host = match parts.next() {
        Some(host) => host,
        None => return false,
    };
    if parts.next().is_none() {
        return false;
    }

    host.split('.').count() >= 2
}

fn is_local_import(import_path: &str) -> bool {
    import_path == "."
        || import_path == ".."
        || import_path.starts_with("./")
        || import_path.starts_with("../")
        || import_path.starts_with('/')
}
