//! Fetch/update driver.
//!
//! For every import path the walker reaches, make sure the package is on
//! disk (fetching its repository if it is not), read its direct imports and
//! record them in the graph.

use std::fs;
use std::io;

use anyhow::{anyhow, bail, Context, Result};

use crate::core::declared::declared_for;
use crate::core::{DeclaredDependency, Dependencies, PackageReader, StringSet, Workspace};
use crate::resolver::walker::{DependencyVisitor, Visit};
use crate::sources::{RepoResolver, Vcs};

/// Fetches missing packages and records the import graph.
pub struct DependencyLoader<'a> {
    deps: Dependencies,
    declared: Vec<DeclaredDependency>,
    workspace: Workspace,
    resolver: &'a dyn RepoResolver,
    reader: &'a dyn PackageReader,

    /// Re-pin packages already on disk to their declared revision
    update: bool,

    /// Pin roots already at their declared revision
    pinned: StringSet,
}

impl<'a> DependencyLoader<'a> {
    pub fn new(
        resolver: &'a dyn RepoResolver,
        reader: &'a dyn PackageReader,
        declared: Vec<DeclaredDependency>,
        workspace: Workspace,
    ) -> Self {
        DependencyLoader {
            deps: Dependencies::new(),
            declared,
            workspace,
            resolver,
            reader,
            update: false,
            pinned: StringSet::new(),
        }
    }

    /// Also move packages already on disk to their declared revision.
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Fetch or update `pkg`, then record its imports.
    pub fn fetch_update_package(&mut self, pkg: &str) -> Result<()> {
        tracing::debug!("DepLoader handling pkg: {}", pkg);
        let path = self.workspace.package_source(pkg);

        let on_disk = match fs::metadata(&path) {
            Ok(meta) if !meta.is_dir() => bail!(
                "cant fetch pkg for path {} is a file not a directory",
                path.display()
            ),
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("cant fetch package {} error when stating {}", pkg, path.display())
                })
            }
        };

        let declared = declared_for(&self.declared, pkg).cloned();
        if !on_disk {
            tracing::debug!("Resolving repo for {} path {}", pkg, path.display());
            let vcs = self
                .resolver
                .resolve_repo(pkg, declared.as_ref())
                .with_context(|| format!("{} version control", pkg))?;
            self.fetch_package(vcs.as_ref(), declared.as_ref())
                .with_context(|| format!("cant fetch package {}", pkg))?;
        } else if self.update {
            if let Some(pin) = &declared {
                self.update_package(pkg, pin)?;
            }
        }

        tracing::debug!("DepLoader reading deps of path: {}", path.display());
        let imports = self
            .reader
            .read_imports(&path)
            .into_result()
            .with_context(|| format!("package {} couldn't read deps", pkg))?;
        tracing::debug!("Read package {} deps: {:?}", pkg, imports);

        self.deps.record_package(pkg, imports);
        Ok(())
    }

    fn fetch_package(&mut self, vcs: &dyn Vcs, declared: Option<&DeclaredDependency>) -> Result<()> {
        let revision = declared.and_then(|pin| pin.revision.as_deref());
        tracing::info!("Fetching {} at {}", vcs.root(), revision.unwrap_or("default revision"));

        vcs.create(revision)
            .with_context(|| format!("failed to fetch {}", vcs.root()))?;
        if let (Some(pin), Some(_)) = (declared, revision) {
            self.pinned.add(pin.root.clone());
        }
        Ok(())
    }

    fn update_package(&mut self, pkg: &str, pin: &DeclaredDependency) -> Result<()> {
        let revision = match pin.revision.as_deref() {
            Some(revision) => revision,
            None => return Ok(()),
        };
        if self.pinned.contains(&pin.root) {
            return Ok(());
        }

        let vcs = self
            .resolver
            .resolve_repo(pkg, Some(pin))
            .with_context(|| format!("{} version control", pkg))?;
        tracing::info!("Setting {} to revision {}", vcs.root(), revision);
        vcs.set_revision(revision)
            .with_context(|| format!("failed to set revision of {}", pkg))?;

        self.pinned.add(pin.root.clone());
        Ok(())
    }

    /// Import paths `pkg` depends on. `pkg` must already be recorded.
    pub fn package_imports(&self, pkg: &str) -> Result<Vec<String>> {
        let dep = self
            .deps
            .dependency(pkg)
            .ok_or_else(|| anyhow!("no dep for {}, should not be requested", pkg))?;
        Ok(dep.imports.to_vec())
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.deps
    }

    pub fn into_dependencies(self) -> Dependencies {
        self.deps
    }
}

impl DependencyVisitor for DependencyLoader<'_> {
    type Node = String;

    fn handle(&mut self, pkg: &String) -> Result<Visit> {
        self.fetch_update_package(pkg)?;
        Ok(Visit::Descend)
    }

    fn read(&mut self, pkg: &String) -> Result<Vec<String>> {
        self.package_imports(pkg)
    }
}
