//! Reachability Queries
//!
//! Walks the dependent relation of a [`DependencyGraph`]. Used both to
//! reject cycle-closing edges and to find everything downstream of a
//! failed step.

use std::collections::BTreeSet;

use super::DependencyGraph;

/// Returns true if making `dependent` depend on `dependency` would close a cycle.
///
/// The edge is unsafe when `dependency` is `dependent` itself or is already
/// reachable from `dependent` by following dependents outward. Unknown
/// names cannot close a cycle.
pub fn would_create_cycle(graph: &DependencyGraph, dependent: &str, dependency: &str) -> bool {
    if !graph.contains(dependent) || !graph.contains(dependency) {
        return false;
    }

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack: Vec<&str> = vec![dependent];

    while let Some(current) = stack.pop() {
        if current == dependency {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(node) = graph.node(current) {
            stack.extend(node.dependents().iter().map(String::as_str));
        }
    }

    false
}

/// Collects every node transitively reachable from `start` via dependents.
///
/// `start` itself is not included.
pub fn transitive_dependents(graph: &DependencyGraph, start: &str) -> BTreeSet<String> {
    let mut reached: BTreeSet<String> = BTreeSet::new();
    let mut stack: Vec<&str> = match graph.node(start) {
        Some(node) => node.dependents().iter().map(String::as_str).collect(),
        None => return reached,
    };

    while let Some(current) = stack.pop() {
        if !reached.insert(current.to_string()) {
            continue;
        }
        if let Some(node) = graph.node(current) {
            stack.extend(node.dependents().iter().map(String::as_str));
        }
    }

    reached
}
