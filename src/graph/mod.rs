//! Dependency Graph Module
//!
//! The state machine behind workflow scheduling: nodes, edges with cycle
//! rejection, readiness tracking and cascading failure.
//!
//! # Structure
//!
//! - [`node`]: Per-step state and status
//! - [`dependency_graph`]: Node ownership and pending/finished/failed/blocked sets
//! - [`cycle`]: Reachability queries over the dependent relation

pub mod cycle;
pub mod dependency_graph;
pub mod node;

pub use cycle::{transitive_dependents, would_create_cycle};
pub use dependency_graph::{BlockedStep, DependencyGraph};
pub use node::{DependencyNode, NodeStatus};
