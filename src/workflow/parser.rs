//! Workflow Parser
//!
//! Loads and saves workflow definitions as YAML.

use std::fs;
use std::path::Path;

use log::{debug, info};

use super::model::Workflow;
use super::validator::validate_workflow;
use crate::error::WorkflowError;

/// Parses and validates a workflow from YAML text.
pub fn parse_workflow(yaml_content: &str) -> Result<Workflow, WorkflowError> {
    let workflow: Workflow = serde_yaml::from_str(yaml_content)?;
    info!("Parsed workflow '{}' with {} steps", workflow.name, workflow.steps.len());

    validate_workflow(&workflow)?;
    Ok(workflow)
}

/// Loads a workflow from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use dagflow::workflow::load_workflow;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let workflow = load_workflow("demos/grant_approval.yaml")?;
///     println!("Loaded {} steps", workflow.steps.len());
///     Ok(())
/// }
/// ```
pub fn load_workflow(path: impl AsRef<Path>) -> Result<Workflow, WorkflowError> {
    let path = path.as_ref();
    info!("Loading workflow from: {}", path.display());

    let yaml_content = fs::read_to_string(path).map_err(|source| WorkflowError::Read {
        path: path.display().to_string(),
        source,
    })?;
    debug!("YAML content loaded ({} bytes)", yaml_content.len());

    parse_workflow(&yaml_content)
}

/// Saves a workflow to a YAML file.
pub fn save_workflow(workflow: &Workflow, path: impl AsRef<Path>) -> Result<(), WorkflowError> {
    let path = path.as_ref();
    let yaml_content = serde_yaml::to_string(workflow).map_err(WorkflowError::Serialize)?;
    fs::write(path, yaml_content).map_err(|source| WorkflowError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!("Workflow saved to: {}", path.display());
    Ok(())
}
