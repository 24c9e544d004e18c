//! Traversal and resolution error types.

use thiserror::Error;

/// A traversal-fatal error. Aborts the whole walk.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The visitor failed to handle a node.
    #[error("failed to handle {node}")]
    Handle {
        node: String,
        #[source]
        source: anyhow::Error,
    },

    /// The visitor could not list the children of a node.
    #[error("cant read deps of package {node}")]
    Read {
        node: String,
        #[source]
        source: anyhow::Error,
    },
}

impl WalkError {
    /// Identity of the node the traversal failed on.
    pub fn node(&self) -> &str {
        match self {
            WalkError::Handle { node, .. } | WalkError::Read { node, .. } => node,
        }
    }
}

/// A resolution-fatal error. Aborts the whole sources pass.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cant get revision from vcs at {root}")]
    Revision {
        root: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cant get vcs source from vcs at {root}")]
    Source {
        root: String,
        #[source]
        source: anyhow::Error,
    },
}
