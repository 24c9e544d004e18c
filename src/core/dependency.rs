//! Dependency graph model.
//!
//! A [`Dependency`] is one discovered package, keyed by import path. The
//! [`Dependencies`] collection holds exactly one record per import path;
//! adding a package that is already present merges its edge sets into the
//! existing record instead of replacing it.

use std::collections::btree_map::{self, BTreeMap};
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::core::StringSet;

/// A node-local failure recorded on a package inside the graph.
///
/// These never abort a traversal; they are kept so whoever persists the
/// graph can report them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("cant determine import path for {path}: {message}")]
    ImportPath { path: PathBuf, message: String },

    #[error("cant save deps for path {path} could not be found on disk")]
    NotFound { path: PathBuf },

    #[error("cant save deps for path {path} is a file not a directory")]
    NotADirectory { path: PathBuf },

    #[error("cant save deps for path {path} due to {message}")]
    Stat { path: PathBuf, message: String },

    #[error("cant read deps for package {package}: {message}")]
    Read { package: String, message: String },
}

impl Serialize for DependencyError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One discovered package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Import path of the package
    pub import_path: String,

    /// Packages this package imports directly
    pub imports: StringSet,

    /// Packages that import this package directly
    pub imported_from: StringSet,

    /// Error recorded while discovering this package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<DependencyError>,
}

impl Dependency {
    /// Create an empty dependency for an import path.
    pub fn new(import_path: impl Into<String>) -> Self {
        Dependency {
            import_path: import_path.into(),
            imports: StringSet::new(),
            imported_from: StringSet::new(),
            err: None,
        }
    }

    /// Create a placeholder carrying an error.
    pub fn with_error(import_path: impl Into<String>, err: DependencyError) -> Self {
        let mut dep = Dependency::new(import_path);
        dep.err = Some(err);
        dep
    }

    /// Merge another record for the same import path into this one.
    ///
    /// Edge sets are unioned. An error already recorded is kept; otherwise
    /// the incoming error (if any) is adopted.
    pub fn merge(&mut self, other: Dependency) {
        debug_assert_eq!(self.import_path, other.import_path);
        self.imports.union(&other.imports);
        self.imported_from.union(&other.imported_from);
        if self.err.is_none() {
            self.err = other.err;
        }
    }

    /// Check whether an error was recorded for this package.
    pub fn has_error(&self) -> bool {
        self.err.is_some()
    }
}

/// All discovered packages, keyed by import path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dependencies {
    deps: BTreeMap<String, Dependency>,
}

impl Dependencies {
    /// Create an empty collection.
    pub fn new() -> Self {
        Dependencies {
            deps: BTreeMap::new(),
        }
    }

    /// Look up a dependency by import path.
    pub fn dependency(&self, import_path: &str) -> Option<&Dependency> {
        self.deps.get(import_path)
    }

    /// Add a dependency, merging into an existing record with the same
    /// import path.
    pub fn add_dependency(&mut self, dep: Dependency) {
        match self.deps.entry(dep.import_path.clone()) {
            btree_map::Entry::Occupied(mut existing) => existing.get_mut().merge(dep),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(dep);
            }
        }
    }

    /// Add every dependency, applying the same merge rule per element.
    pub fn add_dependencies(&mut self, deps: impl IntoIterator<Item = Dependency>) {
        for dep in deps {
            self.add_dependency(dep);
        }
    }

    /// Record a package and the packages it imports directly.
    ///
    /// Each import gains `import_path` as an importer, then the package
    /// itself is added with the imports as its edges. Both steps merge into
    /// records that already exist.
    pub fn record_package<I, S>(&mut self, import_path: &str, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dep = Dependency::new(import_path);
        for import in imports {
            let mut imported = Dependency::new(import);
            imported.imported_from.add(import_path);
            dep.imports.add(imported.import_path.clone());
            self.add_dependency(imported);
        }
        tracing::debug!("Adding dep {} with imports {}", dep.import_path, dep.imports);
        self.add_dependency(dep);
    }

    /// Iterate over dependencies in import path order.
    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.deps.values()
    }

    /// Import paths of every recorded dependency.
    pub fn import_paths(&self) -> impl Iterator<Item = &str> {
        self.deps.keys().map(String::as_str)
    }

    /// Dependencies with a recorded error.
    pub fn errors(&self) -> impl Iterator<Item = &Dependency> {
        self.deps.values().filter(|dep| dep.has_error())
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

impl IntoIterator for Dependencies {
    type Item = Dependency;
    type IntoIter = btree_map::IntoValues<String, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.into_values()
    }
}

impl FromIterator<Dependency> for Dependencies {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        let mut deps = Dependencies::new();
        deps.add_dependencies(iter);
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(path: &str, imports: &[&str], from: &[&str]) -> Dependency {
        let mut dep = Dependency::new(path);
        dep.imports.extend(imports.iter().copied());
        dep.imported_from.extend(from.iter().copied());
        dep
    }

    #[test]
    fn test_add_dependency_inserts() {
        let mut deps = Dependencies::new();
        deps.add_dependency(dep("example.org/a", &["example.org/b"], &[]));

        assert_eq!(deps.len(), 1);
        assert!(deps.dependency("example.org/a").is_some());
        assert!(deps.dependency("example.org/b").is_none());
    }

    #[test]
    fn test_add_dependency_merges_edge_sets() {
        let mut deps = Dependencies::new();
        deps.add_dependency(dep("example.org/c", &["example.org/x"], &["example.org/a"]));
        deps.add_dependency(dep("example.org/c", &["example.org/y"], &["example.org/b"]));

        assert_eq!(deps.len(), 1);
        let c = deps.dependency("example.org/c").unwrap();
        assert_eq!(c.imports.to_vec(), vec!["example.org/x", "example.org/y"]);
        assert_eq!(
            c.imported_from.to_vec(),
            vec!["example.org/a", "example.org/b"]
        );
    }

    #[test]
    fn test_merge_keeps_first_error() {
        let mut deps = Dependencies::new();
        let first = DependencyError::NotFound {
            path: PathBuf::from("/ws/src/example.org/a"),
        };
        let second = DependencyError::Read {
            package: "example.org/a".to_string(),
            message: "boom".to_string(),
        };
        deps.add_dependency(Dependency::with_error("example.org/a", first.clone()));
        deps.add_dependency(Dependency::with_error("example.org/a", second));

        assert_eq!(deps.dependency("example.org/a").unwrap().err, Some(first));
    }

    #[test]
    fn test_merge_adopts_error_when_none_recorded() {
        let mut deps = Dependencies::new();
        deps.add_dependency(dep("example.org/a", &[], &["example.org/root"]));
        let err = DependencyError::Read {
            package: "example.org/a".to_string(),
            message: "boom".to_string(),
        };
        deps.add_dependency(Dependency::with_error("example.org/a", err.clone()));

        let a = deps.dependency("example.org/a").unwrap();
        assert_eq!(a.err, Some(err));
        assert!(a.imported_from.contains("example.org/root"));
        assert_eq!(deps.errors().count(), 1);
    }

    #[test]
    fn test_add_dependencies_bulk() {
        let deps: Dependencies = vec![
            dep("example.org/b", &[], &["example.org/a"]),
            dep("example.org/c", &[], &["example.org/a"]),
            dep("example.org/b", &[], &["example.org/d"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(deps.len(), 2);
        assert_eq!(
            deps.import_paths().collect::<Vec<_>>(),
            vec!["example.org/b", "example.org/c"]
        );
        assert_eq!(
            deps.dependency("example.org/b").unwrap().imported_from.len(),
            2
        );
    }

    #[test]
    fn test_record_package_tracks_provenance() {
        let mut deps = Dependencies::new();
        deps.record_package("A", ["B", "C"]);
        deps.record_package("B", ["C"]);
        deps.record_package("C", Vec::<String>::new());

        let c = deps.dependency("C").unwrap();
        assert_eq!(c.imported_from.to_vec(), vec!["A", "B"]);
        assert!(c.imports.is_empty());
        assert_eq!(deps.dependency("A").unwrap().imports.to_vec(), vec!["B", "C"]);
        assert_eq!(deps.dependency("B").unwrap().imported_from.to_vec(), vec!["A"]);
        assert_eq!(deps.len(), 3);
    }

    #[test]
    fn test_error_serializes_as_message() {
        let dep = Dependency::with_error(
            "example.org/a",
            DependencyError::NotADirectory {
                path: PathBuf::from("/ws/src/example.org/a"),
            },
        );
        let json = serde_json::to_value(&dep).unwrap();
        assert_eq!(
            json["err"],
            "cant save deps for path /ws/src/example.org/a is a file not a directory"
        );
    }
}
