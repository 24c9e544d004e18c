//! Package sources.
//!
//! Sources know how to read a package's imports and how to fetch and query
//! the version control repository that holds it.

pub mod git;
pub mod go_list;
pub mod vcs;

pub use git::{GitRepo, GitResolver};
pub use go_list::GoListReader;
pub use vcs::{RepoResolver, Vcs};
