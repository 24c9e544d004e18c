//! Canticle - dependency management for GOPATH style workspaces
//!
//! This crate provides the core library functionality for canticle,
//! including import graph walking, fetching, and snapshotting the
//! repositories a project depends on.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for canticle unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock package readers and repositories, and
/// temp dir workspaces.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{Dependencies, Dependency, Workspace};
pub use crate::resolver::{DependencySources, DependencyWalker};
pub use crate::util::context::GlobalContext;
