//! Version control capability.
//!
//! Everything the resolver needs from a checkout goes through [`Vcs`];
//! mapping an import path to the repository that holds it goes through
//! [`RepoResolver`].

use anyhow::Result;

use crate::core::DeclaredDependency;

/// A handle on one version control repository.
pub trait Vcs {
    /// Root import path of the repository. Not necessarily the import
    /// path it was resolved from.
    fn root(&self) -> &str;

    /// Fetch a fresh checkout, optionally at a revision.
    fn create(&self, revision: Option<&str>) -> Result<()>;

    /// Move an existing checkout to a revision.
    fn set_revision(&self, revision: &str) -> Result<()>;

    /// Exact revision currently checked out.
    fn current_revision(&self) -> Result<String>;

    /// Branch currently checked out.
    fn current_branch(&self) -> Result<String>;

    /// Remote location the checkout was fetched from.
    fn remote_source(&self) -> Result<String>;
}

/// Resolves the repository owning an import path.
pub trait RepoResolver {
    /// `declared` is the project's pin for the import path, if any, and is
    /// used as a hint for where to fetch from.
    fn resolve_repo(
        &self,
        import_path: &str,
        declared: Option<&DeclaredDependency>,
    ) -> Result<Box<dyn Vcs>>;
}

impl<R: RepoResolver + ?Sized> RepoResolver for &R {
    fn resolve_repo(
        &self,
        import_path: &str,
        declared: Option<&DeclaredDependency>,
    ) -> Result<Box<dyn Vcs>> {
        (**self).resolve_repo(import_path, declared)
    }
}
