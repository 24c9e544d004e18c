//! Source consolidation.
//!
//! Groups the packages of a completed graph by the repository that holds
//! them, so each repository is recorded and checked out exactly once.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::declared::declared_for;
use crate::core::workspace::import_path_contains;
use crate::core::{DeclaredDependency, Dependencies, Dependency, StringSet, Workspace};
use crate::resolver::errors::ResolveError;
use crate::sources::{RepoResolver, Vcs};
use crate::util::fs::path_is_child;

/// One repository and the packages it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencySource {
    /// Root import path of the repository; a prefix of every dep's path
    pub root: String,

    /// Revisions recorded for the repository
    pub revisions: StringSet,

    /// Revision checked out on disk
    pub on_disk_revision: String,

    /// Remote sources recorded for the repository
    pub sources: StringSet,

    /// Remote the on-disk checkout came from
    pub on_disk_source: String,

    /// Packages contained in the repository
    pub deps: Dependencies,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl DependencySource {
    pub fn new(root: impl Into<String>) -> Self {
        DependencySource {
            root: root.into(),
            revisions: StringSet::new(),
            on_disk_revision: String::new(),
            sources: StringSet::new(),
            on_disk_source: String::new(),
            deps: Dependencies::new(),
            err: None,
        }
    }

    /// Check whether this repository holds an import path.
    pub fn contains(&self, import_path: &str) -> bool {
        import_path_contains(&self.root, import_path)
    }
}

/// Repositories found for a graph, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencySources {
    sources: Vec<DependencySource>,
}

impl DependencySources {
    pub fn with_capacity(capacity: usize) -> Self {
        DependencySources {
            sources: Vec::with_capacity(capacity),
        }
    }

    /// The source already holding `import_path`, if any. First match wins.
    pub fn dep_source(&self, import_path: &str) -> Option<&DependencySource> {
        self.sources.iter().find(|source| source.contains(import_path))
    }

    fn dep_source_mut(&mut self, import_path: &str) -> Option<&mut DependencySource> {
        self.sources
            .iter_mut()
            .find(|source| source.contains(import_path))
    }

    pub fn add_source(&mut self, source: DependencySource) {
        self.sources.push(source);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencySource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Display for DependencySources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for source in &self.sources {
            writeln!(f, "{}:", source.root)?;
            writeln!(f, "    revision: {}", source.on_disk_revision)?;
            if source.revisions.len() > 1 {
                writeln!(f, "    declared revisions: {}", source.revisions)?;
            }
            writeln!(f, "    source: {}", source.on_disk_source)?;
            if source.sources.len() > 1 {
                writeln!(f, "    declared sources: {}", source.sources)?;
            }
            writeln!(f, "    packages: {}", source.deps.len())?;
            if let Some(err) = &source.err {
                writeln!(f, "    error: {}", err)?;
            }
        }
        Ok(())
    }
}

/// Resolves the repositories holding the packages of a graph.
pub struct SourcesResolver<'a> {
    /// Project save root; a repository containing it is never recorded
    root_path: PathBuf,
    workspace: Workspace,
    resolver: &'a dyn RepoResolver,

    /// Record branch names rather than exact revisions where possible
    branches: bool,
    declared: Vec<DeclaredDependency>,
}

impl<'a> SourcesResolver<'a> {
    pub fn new(resolver: &'a dyn RepoResolver, workspace: Workspace, root_path: impl Into<PathBuf>) -> Self {
        SourcesResolver {
            root_path: root_path.into(),
            workspace,
            resolver,
            branches: false,
            declared: Vec::new(),
        }
    }

    pub fn with_branches(mut self, branches: bool) -> Self {
        self.branches = branches;
        self
    }

    /// Merge these pins into the sources owning their roots.
    pub fn with_declared(mut self, declared: Vec<DeclaredDependency>) -> Self {
        self.declared = declared;
        self
    }

    /// Resolve a source for everything in `deps`. No dependency trees are
    /// walked.
    pub fn resolve_sources(&self, deps: &Dependencies) -> Result<DependencySources, ResolveError> {
        let mut sources = DependencySources::with_capacity(deps.len());

        for dep in deps.iter() {
            tracing::debug!("Finding source for {}", dep.import_path);
            if let Some(source) = sources.dep_source_mut(&dep.import_path) {
                tracing::debug!("Dep already added {}", dep.import_path);
                source.deps.add_dependency(dep.clone());
                continue;
            }

            let declared = declared_for(&self.declared, &dep.import_path);
            let vcs = match self.resolver.resolve_repo(&dep.import_path, declared) {
                Ok(vcs) => vcs,
                Err(e) => {
                    tracing::warn!("Skipping dep {}, {:#}", dep.import_path, e);
                    continue;
                }
            };

            let root = vcs.root().to_string();
            let root_src = self.workspace.package_source(&root);
            if path_is_child(&root_src, &self.root_path) {
                tracing::debug!(
                    "Skipping pkg {} since its vcs is at our save level",
                    dep.import_path
                );
                continue;
            }

            sources.add_source(self.new_source(vcs.as_ref(), dep)?);
        }

        self.apply_declared(&mut sources);
        Ok(sources)
    }

    fn new_source(&self, vcs: &dyn Vcs, dep: &Dependency) -> Result<DependencySource, ResolveError> {
        let mut source = DependencySource::new(vcs.root());

        let revision = self.revision(vcs)?;
        source.revisions.add(revision.clone());
        source.on_disk_revision = revision;

        let remote = vcs.remote_source().map_err(|e| ResolveError::Source {
            root: vcs.root().to_string(),
            source: e,
        })?;
        source.sources.add(remote.clone());
        source.on_disk_source = remote;

        source.deps.add_dependency(dep.clone());
        Ok(source)
    }

    fn revision(&self, vcs: &dyn Vcs) -> Result<String, ResolveError> {
        if self.branches {
            match vcs.current_branch() {
                Ok(branch) => return Ok(branch),
                Err(e) => tracing::warn!("No branch from vcs at {} {:#}", vcs.root(), e),
            }
        }

        vcs.current_revision().map_err(|e| ResolveError::Revision {
            root: vcs.root().to_string(),
            source: e,
        })
    }

    fn apply_declared(&self, sources: &mut DependencySources) {
        for pin in &self.declared {
            let source = match sources.dep_source_mut(&pin.root) {
                Some(source) => source,
                None => continue,
            };
            if let Some(revision) = &pin.revision {
                source.revisions.add(revision.clone());
            }
            if let Some(remote) = &pin.source {
                source.sources.add(remote.clone());
            }
            if source.revisions.len() > 1 {
                source.err = Some(format!("conflicting revisions {}", source.revisions));
            }
        }
    }
}
