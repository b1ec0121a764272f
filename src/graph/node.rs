//! Dependency Node
//!
//! Per-step state held by the [`DependencyGraph`](super::DependencyGraph).
//! Relations are stored by name; the owning graph resolves them.

use std::collections::BTreeSet;

use serde::Serialize;

/// Lifecycle status of a node.
///
/// `Done` and `Failed` are terminal: a node never returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeStatus {
    /// Not yet reported (waiting, ready, running or stuck)
    Pending,
    /// Reported successful
    Done,
    /// Reported failed
    Failed,
}

impl NodeStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, NodeStatus::Pending)
    }
}

/// A single step in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    name: String,
    /// Unresolved dependencies; shrinks as they complete
    pub(super) dependencies: BTreeSet<String>,
    /// Steps waiting on this one
    pub(super) dependents: BTreeSet<String>,
    pub(super) status: NodeStatus,
}

impl DependencyNode {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            status: NodeStatus::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unresolved dependencies of this node.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Nodes that declared a dependency on this node.
    pub fn dependents(&self) -> &BTreeSet<String> {
        &self.dependents
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// A node is unblocked once every dependency has completed.
    pub fn is_unblocked(&self) -> bool {
        self.dependencies.is_empty()
    }
}
