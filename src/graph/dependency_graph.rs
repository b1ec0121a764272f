//! Dependency Graph
//!
//! Owns every [`DependencyNode`] and tracks which steps are pending,
//! finished or failed, plus which steps were blocked by a failure.
//!
//! # Lifecycle
//!
//! - A node declared without dependencies is pending from the start.
//! - [`DependencyGraph::mark_done`] releases dependents whose last
//!   dependency just completed and returns them.
//! - [`DependencyGraph::mark_failed`] records a blocked pair for every
//!   transitive dependent. Those dependents keep the failed step in their
//!   dependency set, so they never become ready.

use std::collections::{BTreeSet, HashMap};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::GraphError;

use super::cycle::{transitive_dependents, would_create_cycle};
use super::node::{DependencyNode, NodeStatus};

/// A step that can never run because an upstream step failed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlockedStep {
    /// The step that is blocked
    pub step: String,
    /// The failed step that caused the block
    pub cause: String,
}

impl std::fmt::Display for BlockedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is blocked by the failure of {}", self.step, self.cause)
    }
}

/// Dependency graph with readiness tracking.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashMap<String, DependencyNode>,
    pending: BTreeSet<String>,
    finished: BTreeSet<String>,
    failed: BTreeSet<String>,
    blocked: BTreeSet<BlockedStep>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node if it does not exist yet.
    ///
    /// A newly created independent node is immediately pending. Returns
    /// `true` if the node was created.
    pub fn add_node(&mut self, name: &str, independent: bool) -> bool {
        if self.nodes.contains_key(name) {
            return false;
        }

        self.nodes
            .insert(name.to_string(), DependencyNode::new(name));
        if independent {
            self.pending.insert(name.to_string());
        }
        debug!("Added node '{}' (independent: {})", name, independent);
        true
    }

    /// Makes `dependent` wait on `dependency`.
    ///
    /// Missing nodes are created: the dependent as non-independent, the
    /// dependency as independent. If the dependency already existed and the
    /// edge would close a cycle, the edge is rejected and no relation is
    /// changed.
    pub fn add_edge(&mut self, dependent: &str, dependency: &str) -> Result<(), GraphError> {
        self.add_node(dependent, false);

        if !self.add_node(dependency, true) && would_create_cycle(self, dependent, dependency) {
            warn!(
                "Rejected edge {} -> {}: '{}' already depends on '{}'",
                dependent, dependency, dependency, dependent
            );
            return Err(GraphError::CycleRejected {
                dependent: dependent.to_string(),
                dependency: dependency.to_string(),
            });
        }

        self.pending.remove(dependent);
        if let Some(node) = self.nodes.get_mut(dependent) {
            node.dependencies.insert(dependency.to_string());
        }
        if let Some(node) = self.nodes.get_mut(dependency) {
            node.dependents.insert(dependent.to_string());
        }

        debug!("Added edge {} -> {}", dependent, dependency);
        Ok(())
    }

    /// Steps that are ready to run or dispatched but not yet reported.
    pub fn pending(&self) -> &BTreeSet<String> {
        &self.pending
    }

    /// Steps that completed successfully.
    pub fn finished(&self) -> &BTreeSet<String> {
        &self.finished
    }

    /// Steps that reported failure.
    pub fn failed(&self) -> &BTreeSet<String> {
        &self.failed
    }

    /// Blocked pairs recorded by failures, ordered by step then cause.
    pub fn blocked(&self) -> &BTreeSet<BlockedStep> {
        &self.blocked
    }

    /// Returns true if `name` has at least one blocked record.
    pub fn is_blocked(&self, name: &str) -> bool {
        self.blocked.iter().any(|b| b.step == name)
    }

    /// Marks a pending step as done and returns the dependents it released.
    ///
    /// Does nothing (and returns an empty list) unless `name` exists and is
    /// pending.
    pub fn mark_done(&mut self, name: &str) -> Vec<String> {
        if !self.pending.contains(name) {
            return Vec::new();
        }
        let dependents = match self.nodes.get_mut(name) {
            Some(node) => {
                node.status = NodeStatus::Done;
                node.dependents.clone()
            }
            None => return Vec::new(),
        };

        info!("Step '{}' is done", name);
        self.pending.remove(name);
        self.finished.insert(name.to_string());

        let mut actionable = Vec::new();
        for dependent in dependents {
            let Some(node) = self.nodes.get_mut(&dependent) else {
                continue;
            };
            node.dependencies.remove(name);
            if node.is_unblocked() {
                debug!("Step '{}' is now ready", dependent);
                self.pending.insert(dependent.clone());
                actionable.push(dependent);
            }
        }

        actionable
    }

    /// Marks a pending step as failed and blocks everything downstream.
    ///
    /// Returns the steps that acquired a blocked record. Does nothing unless
    /// `name` exists and is pending.
    pub fn mark_failed(&mut self, name: &str) -> Vec<String> {
        if !self.pending.contains(name) {
            return Vec::new();
        }
        match self.nodes.get_mut(name) {
            Some(node) => node.status = NodeStatus::Failed,
            None => return Vec::new(),
        }

        info!("Step '{}' failed", name);
        let affected = transitive_dependents(self, name);
        for step in &affected {
            self.blocked.insert(BlockedStep {
                step: step.clone(),
                cause: name.to_string(),
            });
        }
        self.pending.remove(name);
        self.failed.insert(name.to_string());

        affected.into_iter().collect()
    }

    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Option<&DependencyNode> {
        self.nodes.get(name)
    }

    /// Returns the status of a node, if it exists.
    pub fn status(&self, name: &str) -> Option<NodeStatus> {
        self.nodes.get(name).map(DependencyNode::status)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// All node names, sorted.
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
