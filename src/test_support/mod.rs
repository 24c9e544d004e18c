//! Test utilities and mocks for canticle unit tests.
//!
//! The mocks stand in for the package tool and version control so the
//! drivers can be exercised against a temp directory without `go` or a
//! network.
//!
//! # Example
//!
//! ```rust,ignore
//! use canticle::test_support::{MockReader, MockResolver, WorkspaceFixture};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = WorkspaceFixture::new();
//!     let ws = fixture.workspace();
//!     let reader = MockReader::new().imports(ws.package_source("a.org/x"), &["b.org/y"]);
//!     let resolver = MockResolver::new(&ws).repo("b.org/y", "rev1", "https://b.org/y");
//!     // Hand both to a driver...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};

use crate::core::package::{PackageError, PackageImports, PackageReader};
use crate::core::workspace::import_path_contains;
use crate::core::{DeclaredDependency, Workspace};
use crate::sources::{RepoResolver, Vcs};

pub use fixtures::*;

/// Scripted answer for one package directory.
#[derive(Debug, Clone)]
enum ReadScript {
    Imports(Vec<String>),
    Fails(String),
    Partial(Vec<String>, String),
}

/// Mock package reader.
///
/// Directories without a script read as packages with no imports. Every
/// read is recorded in order.
#[derive(Debug, Default)]
pub struct MockReader {
    scripts: HashMap<PathBuf, ReadScript>,
    reads: RefCell<Vec<PathBuf>>,
}

impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The package in `dir` imports `imports`.
    pub fn imports(mut self, dir: impl Into<PathBuf>, imports: &[&str]) -> Self {
        self.scripts
            .insert(dir.into(), ReadScript::Imports(to_strings(imports)));
        self
    }

    /// Reading `dir` reports a package error.
    pub fn fails(mut self, dir: impl Into<PathBuf>, message: &str) -> Self {
        self.scripts
            .insert(dir.into(), ReadScript::Fails(message.to_string()));
        self
    }

    /// `dir` holds no buildable sources. `message` should carry the tool's
    /// "no buildable" prefix.
    pub fn no_buildable(self, dir: impl Into<PathBuf>, message: &str) -> Self {
        self.fails(dir, message)
    }

    /// Reading `dir` finds `imports` but also reports an error.
    pub fn partial(mut self, dir: impl Into<PathBuf>, imports: &[&str], message: &str) -> Self {
        self.scripts.insert(
            dir.into(),
            ReadScript::Partial(to_strings(imports), message.to_string()),
        );
        self
    }

    /// Directories read so far, in order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.borrow().clone()
    }
}

impl PackageReader for MockReader {
    fn read_imports(&self, dir: &Path) -> PackageImports {
        self.reads.borrow_mut().push(dir.to_path_buf());
        match self.scripts.get(dir) {
            None => PackageImports::ok(Vec::new()),
            Some(ReadScript::Imports(imports)) => PackageImports::ok(imports.clone()),
            Some(ReadScript::Fails(message)) => PackageImports::failed(PackageError::new(message)),
            Some(ReadScript::Partial(imports, message)) => PackageImports {
                imports: imports.clone(),
                error: Some(PackageError::new(message).into()),
            },
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Scripted state of one mock repository.
#[derive(Debug, Clone, Default)]
struct MockRepo {
    root: String,
    revision: String,
    source: String,
    branch: Option<String>,
    broken_revision: bool,
    broken_remote: bool,
}

/// Calls made against the mock repositories.
#[derive(Debug, Default)]
struct MockLog {
    resolved: Vec<String>,
    created: Vec<(String, Option<String>)>,
    revisions_set: Vec<(String, String)>,
}

/// Mock repository resolver.
///
/// Maps import paths to the configured repository whose root contains
/// them. Checkouts made through it create the package directories in the
/// workspace so later reads find them.
pub struct MockResolver {
    workspace: Workspace,
    repos: Vec<MockRepo>,
    log: Rc<RefCell<MockLog>>,
}

impl MockResolver {
    pub fn new(workspace: &Workspace) -> Self {
        MockResolver {
            workspace: workspace.clone(),
            repos: Vec::new(),
            log: Rc::default(),
        }
    }

    /// Add a repository at `root` checked out at `revision` from `source`.
    pub fn repo(mut self, root: &str, revision: &str, source: &str) -> Self {
        self.repos.push(MockRepo {
            root: root.to_string(),
            revision: revision.to_string(),
            source: source.to_string(),
            ..Default::default()
        });
        self
    }

    /// The repository at `root` is on branch `branch`.
    pub fn branch(self, root: &str, branch: &str) -> Self {
        self.edit(root, |repo| repo.branch = Some(branch.to_string()))
    }

    /// Revision queries against `root` fail.
    pub fn broken_revision(self, root: &str) -> Self {
        self.edit(root, |repo| repo.broken_revision = true)
    }

    /// Remote queries against `root` fail.
    pub fn broken_remote(self, root: &str) -> Self {
        self.edit(root, |repo| repo.broken_remote = true)
    }

    fn edit(mut self, root: &str, f: impl FnOnce(&mut MockRepo)) -> Self {
        let repo = self
            .repos
            .iter_mut()
            .find(|repo| repo.root == root)
            .unwrap_or_else(|| panic!("no mock repo {}", root));
        f(repo);
        self
    }

    /// Import paths resolved so far, in order.
    pub fn resolved(&self) -> Vec<String> {
        self.log.borrow().resolved.clone()
    }

    /// `(root, revision)` of every checkout created.
    pub fn created(&self) -> Vec<(String, Option<String>)> {
        self.log.borrow().created.clone()
    }

    /// `(root, revision)` of every revision change.
    pub fn revisions_set(&self) -> Vec<(String, String)> {
        self.log.borrow().revisions_set.clone()
    }
}

impl RepoResolver for MockResolver {
    fn resolve_repo(
        &self,
        import_path: &str,
        _declared: Option<&DeclaredDependency>,
    ) -> Result<Box<dyn Vcs>> {
        self.log.borrow_mut().resolved.push(import_path.to_string());

        let repo = self
            .repos
            .iter()
            .find(|repo| import_path_contains(&repo.root, import_path))
            .ok_or_else(|| anyhow!("no repository for {}", import_path))?;

        Ok(Box::new(MockVcs {
            repo: repo.clone(),
            import_path: import_path.to_string(),
            workspace: self.workspace.clone(),
            log: Rc::clone(&self.log),
        }))
    }
}

/// Repository handle handed out by [`MockResolver`].
pub struct MockVcs {
    repo: MockRepo,
    import_path: String,
    workspace: Workspace,
    log: Rc<RefCell<MockLog>>,
}

impl Vcs for MockVcs {
    fn root(&self) -> &str {
        &self.repo.root
    }

    fn create(&self, revision: Option<&str>) -> Result<()> {
        fs::create_dir_all(self.workspace.package_source(&self.import_path))?;
        self.log
            .borrow_mut()
            .created
            .push((self.repo.root.clone(), revision.map(str::to_string)));
        Ok(())
    }

    fn set_revision(&self, revision: &str) -> Result<()> {
        self.log
            .borrow_mut()
            .revisions_set
            .push((self.repo.root.clone(), revision.to_string()));
        Ok(())
    }

    fn current_revision(&self) -> Result<String> {
        if self.repo.broken_revision {
            bail!("revision unavailable for {}", self.repo.root);
        }
        Ok(self.repo.revision.clone())
    }

    fn current_branch(&self) -> Result<String> {
        self.repo
            .branch
            .clone()
            .ok_or_else(|| anyhow!("{} is not on a branch", self.repo.root))
    }

    fn remote_source(&self) -> Result<String> {
        if self.repo.broken_remote {
            bail!("remote unavailable for {}", self.repo.root);
        }
        Ok(self.repo.source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reader_scripts() {
        let reader = MockReader::new()
            .imports("/ws/src/a", &["b.org/c"])
            .fails("/ws/src/bad", "boom")
            .partial("/ws/src/half", &["d.org/e"], "oops");

        assert_eq!(reader.read_imports(Path::new("/ws/src/a")).imports, vec!["b.org/c"]);
        assert!(reader.read_imports(Path::new("/ws/src/bad")).error.is_some());
        let half = reader.read_imports(Path::new("/ws/src/half"));
        assert_eq!(half.imports, vec!["d.org/e"]);
        assert!(half.error.is_some());
        assert!(reader.read_imports(Path::new("/ws/src/other")).into_result().unwrap().is_empty());
        assert_eq!(reader.reads().len(), 4);
    }

    #[test]
    fn test_mock_resolver_creates_package_dir() {
        let fixture = WorkspaceFixture::new();
        let ws = fixture.workspace();
        let resolver = MockResolver::new(&ws).repo("b.org/repo", "r1", "https://b.org/repo");

        let vcs = resolver.resolve_repo("b.org/repo/sub", None).unwrap();
        assert_eq!(vcs.root(), "b.org/repo");
        vcs.create(Some("v1")).unwrap();

        assert!(ws.package_source("b.org/repo/sub").is_dir());
        assert_eq!(
            resolver.created(),
            vec![("b.org/repo".to_string(), Some("v1".to_string()))]
        );
        assert!(resolver.resolve_repo("c.org/none", None).is_err());
    }
}
