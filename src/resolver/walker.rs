//! Breadth-first dependency walker.
//!
//! The walker owns the frontier queue and the visited set and nothing else.
//! What a node means, how it is handled and what its children are is up to
//! the [`DependencyVisitor`] it is constructed with.

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::path::PathBuf;

use anyhow::Result;

use crate::resolver::errors::WalkError;

/// Identity of a node in a walk.
pub trait NodeId: Clone + Ord + Eq + Hash {
    /// Human readable form, used in logs and errors.
    fn label(&self) -> Cow<'_, str>;
}

impl NodeId for String {
    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl NodeId for PathBuf {
    fn label(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}

/// Outcome of handling a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Read the node's children and enqueue them.
    Descend,
    /// The node is handled; do not read or enqueue its children.
    Skip,
}

/// The pluggable half of a traversal.
///
/// `handle` is called exactly once per reachable node. `read` is called
/// only after `handle` returned [`Visit::Descend`] for the same node. Any
/// error from either aborts the traversal.
pub trait DependencyVisitor {
    type Node: NodeId;

    fn handle(&mut self, node: &Self::Node) -> Result<Visit>;

    fn read(&mut self, node: &Self::Node) -> Result<Vec<Self::Node>>;
}

/// Walks the dependencies of a node breadth first, visiting each node at
/// most once.
pub struct DependencyWalker<V: DependencyVisitor> {
    queue: VecDeque<V::Node>,
    visited: HashSet<V::Node>,
    visitor: V,
}

impl<V: DependencyVisitor> DependencyWalker<V> {
    pub fn new(visitor: V) -> Self {
        DependencyWalker {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            visitor,
        }
    }

    /// Traverse everything reachable from `start`.
    ///
    /// The visited set survives between calls, so traversing a second root
    /// never handles a node the first traversal already handled.
    pub fn traverse(&mut self, start: V::Node) -> Result<(), WalkError> {
        self.queue.clear();
        self.queue.push_back(start);

        while let Some(node) = self.queue.pop_front() {
            // A node may be queued more than once before it is first
            // dequeued; only the first dequeue counts.
            if !self.visited.insert(node.clone()) {
                continue;
            }
            tracing::debug!("Handling pkg: {}", node.label());

            let visit = self.visitor.handle(&node).map_err(|source| WalkError::Handle {
                node: node.label().into_owned(),
                source,
            })?;
            if visit == Visit::Skip {
                continue;
            }

            let mut children = self.visitor.read(&node).map_err(|source| WalkError::Read {
                node: node.label().into_owned(),
                source,
            })?;
            children.sort();
            tracing::debug!("Package {} has {} children", node.label(), children.len());

            for child in children {
                if !self.visited.contains(&child) {
                    self.queue.push_back(child);
                }
            }
        }

        Ok(())
    }

    /// Traverse from each root in order.
    pub fn traverse_all<I>(&mut self, roots: I) -> Result<(), WalkError>
    where
        I: IntoIterator<Item = V::Node>,
    {
        for root in roots {
            self.traverse(root)?;
        }
        Ok(())
    }

    /// Check whether a node has been handled.
    pub fn is_visited(&self, node: &V::Node) -> bool {
        self.visited.contains(node)
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }
}
