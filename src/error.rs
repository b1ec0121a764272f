//! Error Types
//!
//! Errors raised while building graphs, invoking actions and loading
//! workflow definitions.

use thiserror::Error;

use crate::workflow::validator::ValidationError;

/// Errors produced by [`DependencyGraph`](crate::graph::DependencyGraph) mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Adding the edge would close a cycle. The graph is left unchanged.
    #[error("cannot make '{dependent}' depend on '{dependency}': '{dependency}' already depends on '{dependent}'")]
    CycleRejected {
        dependent: String,
        dependency: String,
    },
}

/// Errors raised while invoking an action handler.
///
/// These are distinct from an action reporting
/// [`ActionStatus::Failure`](crate::actions::ActionStatus::Failure): an
/// `ActionError` means the handler could not run at all.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid payload for action '{action_type}': {source}")]
    InvalidPayload {
        action_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("action '{action_type}' could not be invoked: {message}")]
    Invocation {
        action_type: String,
        message: String,
    },
}

/// Errors raised while loading or validating a workflow definition.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("failed to read workflow file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write workflow file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse workflow YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to serialize workflow to YAML: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("workflow has no steps")]
    Empty,

    #[error("step '{0}' already exists")]
    DuplicateStep(String),

    #[error("invalid workflow:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
