//! Git version control for workspace packages.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use git2::build::CheckoutBuilder;
use git2::Repository;
use url::Url;

use crate::core::{DeclaredDependency, Workspace};
use crate::sources::{RepoResolver, Vcs};
use crate::util::fs::ensure_dir;

/// Hosts whose repositories are always `<host>/<owner>/<repo>`.
const KNOWN_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// Name of the remote a checkout is fetched from.
const ORIGIN: &str = "origin";

/// A git checkout inside the workspace.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root import path of the repository
    root: String,

    /// Work tree location
    path: PathBuf,

    /// Remote to clone from when the checkout does not exist yet
    remote: Option<String>,
}

impl GitRepo {
    pub fn new(root: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        GitRepo {
            root: root.into(),
            path: path.into(),
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.path)
            .with_context(|| format!("failed to open git repository: {}", self.path.display()))
    }

    fn fetch(&self, repo: &Repository) -> Result<()> {
        tracing::info!("Fetching {}", self.root);

        let mut remote = repo
            .find_remote(ORIGIN)
            .with_context(|| format!("no `{}` remote in {}", ORIGIN, self.path.display()))?;
        remote
            .fetch::<&str>(&[], None, None)
            .with_context(|| format!("failed to fetch {}", self.root))?;

        Ok(())
    }
}

/// Check out `revision` in `repo`.
///
/// Local branch names leave HEAD on the branch; anything else (tags,
/// commits, remote branches) detaches HEAD at the resolved commit.
fn checkout(repo: &Repository, revision: &str) -> Result<()> {
    let (object, reference) = repo
        .revparse_ext(revision)
        .or_else(|_| repo.revparse_ext(&format!("{}/{}", ORIGIN, revision)))
        .with_context(|| format!("unknown revision `{}`", revision))?;
    let commit = object.peel_to_commit()?;

    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;

    match reference.as_ref().and_then(|r| r.name()) {
        Some(name) if name.starts_with("refs/heads/") => repo.set_head(name)?,
        _ => repo.set_head_detached(commit.id())?,
    }

    Ok(())
}

impl Vcs for GitRepo {
    fn root(&self) -> &str {
        &self.root
    }

    fn create(&self, revision: Option<&str>) -> Result<()> {
        let remote = self
            .remote
            .as_deref()
            .ok_or_else(|| anyhow!("no remote source known for {}", self.root))?;
        tracing::info!("Cloning {} from {}", self.root, remote);

        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let repo = Repository::clone(remote, &self.path)
            .with_context(|| format!("failed to clone {}", remote))?;

        if let Some(revision) = revision {
            checkout(&repo, revision)?;
        }
        Ok(())
    }

    fn set_revision(&self, revision: &str) -> Result<()> {
        let repo = self.open()?;
        if checkout(&repo, revision).is_ok() {
            return Ok(());
        }

        // Revision may be newer than what we have locally.
        self.fetch(&repo)?;
        checkout(&repo, revision)
            .with_context(|| format!("failed to set {} to revision {}", self.root, revision))
    }

    fn current_revision(&self) -> Result<String> {
        let repo = self.open()?;
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .with_context(|| format!("no HEAD commit in {}", self.path.display()))?;
        Ok(commit.id().to_string())
    }

    fn current_branch(&self) -> Result<String> {
        let repo = self.open()?;
        let head = repo.head()?;
        if !head.is_branch() {
            bail!("HEAD is detached in {}", self.path.display());
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("branch name is not valid utf-8 in {}", self.path.display()))
    }

    fn remote_source(&self) -> Result<String> {
        let repo = self.open()?;
        let remote = repo
            .find_remote(ORIGIN)
            .with_context(|| format!("no `{}` remote in {}", ORIGIN, self.path.display()))?;
        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("remote url is not valid utf-8 in {}", self.path.display()))
    }
}

/// Resolves import paths to git repositories in a workspace.
#[derive(Debug, Clone)]
pub struct GitResolver {
    workspace: Workspace,
}

impl GitResolver {
    pub fn new(workspace: Workspace) -> Self {
        GitResolver { workspace }
    }

    /// Find the work tree enclosing an on-disk package, without looking
    /// above the workspace source dir.
    fn discover(&self, import_path: &str) -> Option<(String, PathBuf)> {
        let src = self.workspace.src_dir();
        let start = self.workspace.package_source(import_path);

        start
            .ancestors()
            .take_while(|dir| dir.starts_with(&src) && *dir != src)
            .find(|dir| dir.join(".git").exists())
            .and_then(|dir| {
                let root = self.workspace.package_name(dir).ok()?;
                Some((root, dir.to_path_buf()))
            })
    }
}

/// Guess repository root and remote for a package on a well-known host.
fn known_host_repo(import_path: &str) -> Option<(String, Url)> {
    let parts: Vec<&str> = import_path.split('/').collect();
    if parts.len() < 3 || !KNOWN_HOSTS.contains(&parts[0]) {
        return None;
    }
    let root = parts[..3].join("/");
    let url = Url::parse(&format!("https://{}", root)).ok()?;
    Some((root, url))
}

impl RepoResolver for GitResolver {
    fn resolve_repo(
        &self,
        import_path: &str,
        declared: Option<&DeclaredDependency>,
    ) -> Result<Box<dyn Vcs>> {
        let remote = declared.and_then(|pin| pin.source.clone());

        if self.workspace.package_source(import_path).exists() {
            let (root, path) = self.discover(import_path).ok_or_else(|| {
                anyhow!("no version control found for {}", import_path)
            })?;
            let mut repo = GitRepo::new(root, path);
            if let Some(remote) = remote {
                repo = repo.with_remote(remote);
            }
            return Ok(Box::new(repo));
        }

        let guessed = known_host_repo(import_path);
        let root = match (declared, &guessed) {
            (Some(pin), _) => pin.root.clone(),
            (None, Some((root, _))) => root.clone(),
            (None, None) => bail!(
                "cant determine repository for {}, declare a source for it",
                import_path
            ),
        };
        let remote = match (remote, guessed) {
            (Some(remote), _) => remote,
            (None, Some((_, url))) => url.to_string(),
            (None, None) => bail!("no remote source known for {}", import_path),
        };

        let path = self.workspace.package_source(&root);
        Ok(Box::new(GitRepo::new(root, path).with_remote(remote)))
    }
}
