//! Core data structures for canticle.
//!
//! This module contains the foundational types used throughout canticle:
//! - The dependency graph model
//! - Declared dependency pins
//! - The package reader capability
//! - Workspace path mapping

pub mod declared;
pub mod dependency;
pub mod package;
pub mod string_set;
pub mod workspace;

pub use declared::DeclaredDependency;
pub use dependency::{Dependencies, Dependency, DependencyError};
pub use package::{PackageError, PackageImports, PackageReader, ReadError};
pub use string_set::StringSet;
pub use workspace::{Workspace, WorkspaceError};
