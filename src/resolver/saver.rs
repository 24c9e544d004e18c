//! Snapshot driver.
//!
//! Records the dependency graph as it currently exists on disk, without
//! fetching anything. Nodes are filesystem paths. Under the project save
//! root the walk follows the directory tree as well as import edges, so
//! every package physically inside the project is recorded along with the
//! out-of-tree packages it reaches through imports.
//!
//! Problems with individual packages are recorded on their graph node and
//! never abort the snapshot. Only failing to list a directory does.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{
    Dependencies, Dependency, DependencyError, PackageImports, PackageReader, StringSet,
    Workspace,
};
use crate::resolver::walker::{DependencyVisitor, Visit};
use crate::util::fs::{path_is_child, visible_sub_directories};

/// Saves the current on-disk dependency graph of a project.
pub struct DependencySaver<'a> {
    deps: Dependencies,
    workspace: Workspace,
    root: PathBuf,
    reader: &'a dyn PackageReader,

    /// Directory names never recursed into under the save root
    no_recur: StringSet,
}

impl<'a> DependencySaver<'a> {
    /// Create a saver for the project at `root` inside `workspace`.
    pub fn new(reader: &'a dyn PackageReader, workspace: Workspace, root: impl Into<PathBuf>) -> Self {
        DependencySaver {
            deps: Dependencies::new(),
            workspace,
            root: root.into(),
            reader,
            no_recur: StringSet::new(),
        }
    }

    /// Never recurse into directories with these names.
    pub fn with_no_recur<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_recur.extend(names);
        self
    }

    /// Get the project save root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record the first order dependencies of the package at `path`.
    pub fn save_package_deps(&mut self, path: &Path) -> Visit {
        tracing::debug!("Examine path {}", path.display());
        let pkg = match self.workspace.package_name(path) {
            Ok(pkg) => pkg,
            Err(e) => {
                tracing::debug!("No import path for {}: {}", path.display(), e);
                let err = DependencyError::ImportPath {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                self.deps
                    .add_dependency(Dependency::with_error(path.to_string_lossy(), err));
                return Visit::Skip;
            }
        };

        let stat_err = match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => None,
            Ok(_) => Some(DependencyError::NotADirectory {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Some(DependencyError::NotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Some(DependencyError::Stat {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        };
        if let Some(err) = stat_err {
            tracing::debug!("Error stating path {}: {}", path.display(), err);
            self.deps.add_dependency(Dependency::with_error(pkg, err));
            return Visit::Skip;
        }

        // The bare source dir is never a package.
        if self.workspace.is_src_dir(path) {
            return Visit::Skip;
        }

        let PackageImports { imports, error } = self.reader.read_imports(path);
        if let Some(error) = error {
            if imports.is_empty() {
                // An empty directory is not a package, but its
                // subdirectories may still be.
                if error.is_no_buildable() {
                    tracing::debug!("Unbuildable pkg {}", pkg);
                    return Visit::Descend;
                }

                tracing::debug!("Error reading pkg deps {}: {:#}", pkg, error);
                let err = DependencyError::Read {
                    package: pkg.clone(),
                    message: format!("{:#}", error),
                };
                self.deps.add_dependency(Dependency::with_error(pkg, err));
                return Visit::Descend;
            }
            tracing::debug!("Pkg {} read with error {:#}, keeping its imports", pkg, error);
        }

        self.deps.record_package(&pkg, imports);
        Visit::Descend
    }

    /// Paths to visit after `path`: its visible subdirectories when it is
    /// inside the save root, plus the locations of its recorded imports.
    pub fn package_paths(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = BTreeSet::new();
        if path_is_child(&self.root, path) {
            let subdirs = visible_sub_directories(path)?;
            paths.extend(subdirs.into_iter().filter(|dir| !self.is_no_recur(dir)));
        }

        let pkg = self.workspace.package_name(path)?;
        match self.deps.dependency(&pkg) {
            None => tracing::debug!("Package has no dep {}", pkg),
            Some(dep) if dep.has_error() => {
                tracing::debug!("Package dep err not nil {}", pkg);
                return Ok(Vec::new());
            }
            Some(dep) => {
                tracing::debug!("Package {} has imports {}", pkg, dep.imports);
                paths.extend(dep.imports.iter().map(|imp| self.workspace.package_source(imp)));
            }
        }

        Ok(paths.into_iter().collect())
    }

    fn is_no_recur(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.no_recur.contains(name))
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.deps
    }

    pub fn into_dependencies(self) -> Dependencies {
        self.deps
    }
}

impl DependencyVisitor for DependencySaver<'_> {
    type Node = PathBuf;

    fn handle(&mut self, path: &PathBuf) -> Result<Visit> {
        Ok(self.save_package_deps(path))
    }

    fn read(&mut self, path: &PathBuf) -> Result<Vec<PathBuf>> {
        self.package_paths(path)
    }
}
