//! Workflow Validation
//!
//! Checks a workflow definition before it is turned into a graph:
//! - Step field validation
//! - Duplicate step IDs
//! - Dependency references (warnings only)
//!
//! Cycles are not checked here. The graph rejects cycle-closing edges
//! while it is built.

use std::collections::HashSet;

use log::{debug, info, warn};
use thiserror::Error;

use super::model::{Workflow, WorkflowStep};
use crate::error::WorkflowError;

/// Validation error types for user-friendly error messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Duplicate step ID: '{0}'")]
    DuplicateStepId(String),

    #[error("Step has empty or whitespace-only ID")]
    EmptyStepId,

    #[error("Step '{0}' has no action type")]
    EmptyActionType(String),

    #[error("Step '{0}' has an empty dependency name")]
    EmptyDependency(String),
}

/// Validates a single step's fields.
fn validate_step(step: &WorkflowStep) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if step.id.trim().is_empty() {
        errors.push(ValidationError::EmptyStepId);
        return errors;
    }

    if step.action_type.trim().is_empty() {
        errors.push(ValidationError::EmptyActionType(step.id.clone()));
    }

    if step.dependency_names().iter().any(|d| d.trim().is_empty()) {
        errors.push(ValidationError::EmptyDependency(step.id.clone()));
    }

    if step.is_independent() {
        debug!("Step '{}' is a root step (no dependencies)", step.id);
    }

    errors
}

/// Validates the workflow structure.
///
/// Rejects empty workflows, duplicate IDs and malformed steps. References
/// to undeclared steps and self-dependencies are only warned about: the
/// graph creates undeclared names as nodes and rejects self-edges.
pub fn validate_workflow(workflow: &Workflow) -> Result<(), WorkflowError> {
    info!("Validating workflow with {} steps", workflow.steps.len());

    if workflow.steps.is_empty() {
        return Err(WorkflowError::Empty);
    }

    let mut errors = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for step in &workflow.steps {
        if !step.id.trim().is_empty() && !seen_ids.insert(step.id.as_str()) {
            errors.push(ValidationError::DuplicateStepId(step.id.clone()));
        }
        errors.extend(validate_step(step));
    }

    for step in &workflow.steps {
        for dependency in step.dependency_names() {
            if dependency == &step.id {
                warn!("Step '{}' depends on itself; the edge will be rejected", step.id);
            } else if !dependency.trim().is_empty() && !seen_ids.contains(dependency.as_str()) {
                warn!(
                    "Step '{}' depends on undeclared step '{}'; it will never run",
                    step.id, dependency
                );
            }
        }
    }

    if !errors.is_empty() {
        return Err(WorkflowError::Invalid(errors));
    }

    info!("Workflow '{}' validated: {} steps", workflow.name, workflow.steps.len());
    Ok(())
}
