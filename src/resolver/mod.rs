//! Dependency resolution.
//!
//! Resolution here means walking the import graph of a project, fetching
//! what is missing as we go, and then consolidating the packages found into
//! the repositories that hold them.

pub mod errors;
pub mod loader;
pub mod saver;
pub mod sources;
pub mod walker;

pub use errors::{ResolveError, WalkError};
pub use loader::DependencyLoader;
pub use saver::DependencySaver;
pub use sources::{DependencySource, DependencySources, SourcesResolver};
pub use walker::{DependencyVisitor, DependencyWalker, NodeId, Visit};
