//! Workflow Data Model
//!
//! Step descriptors and the workflow that groups them.
//!
//! # Example YAML Format
//!
//! ```yaml
//! name: Grant approval
//! steps:
//!   - id: wait
//!     action: WAIT
//!     payload:
//!       wait_time_seconds: 5
//!
//!   - id: updateGrant2
//!     action: UPDATE_GRANT
//!     payload:
//!       grant_id: updateGrant2
//!       status: approved
//!     dependencies:
//!       - wait
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::actions::{ActionRegistry, ActionStatus};
use crate::error::{ActionError, WorkflowError};

/// A single step in a workflow.
///
/// Pairs an action descriptor with the names of the steps it waits on.
/// Immutable once the workflow starts running.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowStep {
    /// Unique step name
    #[serde(deserialize_with = "trimmed")]
    pub id: String,

    /// Action type identifier (e.g., "SEND_EMAIL")
    #[serde(rename = "action", deserialize_with = "trimmed")]
    pub action_type: String,

    /// Action-specific payload
    #[serde(default)]
    pub payload: Value,

    /// Names of steps that must succeed before this step runs
    #[serde(
        default,
        deserialize_with = "trimmed_names",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependencies: Option<Vec<String>>,
}

// Names are trimmed on every path into a step, so " a" and "a" are one node.
fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

fn trimmed_names<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let names = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(names.map(|names| names.iter().map(|n| n.trim().to_string()).collect()))
}

impl WorkflowStep {
    /// Creates a step with no payload and no dependencies.
    ///
    /// # Example
    ///
    /// ```
    /// use dagflow::workflow::WorkflowStep;
    /// use serde_json::json;
    ///
    /// let step = WorkflowStep::new("sendEmail1", "SEND_EMAIL")
    ///     .with_payload(json!({ "to": "a@example.com", "subject": "Hi", "body": "Done" }))
    ///     .depends_on("updateGrant1");
    /// assert_eq!(step.dependency_names(), ["updateGrant1"]);
    /// ```
    pub fn new(id: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            action_type: action_type.into().trim().to_string(),
            payload: Value::Null,
            dependencies: None,
        }
    }

    /// Sets the action payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Adds a dependency on another step.
    pub fn depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.dependencies
            .get_or_insert_with(Vec::new)
            .push(step_id.into().trim().to_string());
        self
    }

    /// Declared dependency names; empty when none were declared.
    pub fn dependency_names(&self) -> &[String] {
        self.dependencies.as_deref().unwrap_or(&[])
    }

    /// Returns true if the step declares no dependency.
    pub fn is_independent(&self) -> bool {
        self.dependency_names().is_empty()
    }

    /// Runs the step's action and returns its status.
    pub async fn execute(&self, registry: &ActionRegistry) -> Result<ActionStatus, ActionError> {
        registry.invoke(&self.action_type, &self.payload).await
    }
}

/// A named, ordered collection of steps.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Workflow {
    /// Display name
    #[serde(default = "default_name")]
    pub name: String,

    /// Steps in declaration order
    pub steps: Vec<WorkflowStep>,
}

fn default_name() -> String {
    "workflow".to_string()
}

impl Workflow {
    /// Creates a new empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Creates a workflow from a list of steps.
    pub fn from_steps(name: impl Into<String>, steps: Vec<WorkflowStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Adds a step to the workflow.
    pub fn add_step(&mut self, step: WorkflowStep) -> Result<(), WorkflowError> {
        if self.get_step(&step.id).is_some() {
            return Err(WorkflowError::DuplicateStep(step.id));
        }
        self.steps.push(step);
        Ok(())
    }

    /// Gets a step by ID.
    pub fn get_step(&self, id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Returns steps with no dependencies (entry points).
    pub fn root_steps(&self) -> Vec<&WorkflowStep> {
        self.steps.iter().filter(|s| s.is_independent()).collect()
    }

    /// Returns the number of steps in the workflow.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the workflow has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_creation() {
        let step = WorkflowStep::new(" updateGrant1 ", "UPDATE_GRANT")
            .with_payload(json!({ "grant_id": "updateGrant1", "status": "approved" }));

        assert_eq!(step.id, "updateGrant1");
        assert_eq!(step.action_type, "UPDATE_GRANT");
        assert_eq!(step.payload["grant_id"], "updateGrant1");
        assert!(step.dependencies.is_none());
        assert!(step.is_independent());
    }

    #[test]
    fn test_step_dependencies() {
        let step = WorkflowStep::new("sendEmail2", "SEND_EMAIL")
            .depends_on("updateGrant1")
            .depends_on("updateGrant2");

        assert_eq!(step.dependency_names(), ["updateGrant1", "updateGrant2"]);
        assert!(!step.is_independent());
    }

    #[test]
    fn test_empty_dependency_list_is_independent() {
        let mut step = WorkflowStep::new("a", "WAIT");
        step.dependencies = Some(Vec::new());
        assert!(step.is_independent());
    }

    #[test]
    fn test_workflow_add_step() {
        let mut workflow = Workflow::new("test");
        let step = WorkflowStep::new("step1", "WAIT");

        assert!(workflow.add_step(step.clone()).is_ok());
        assert!(matches!(
            workflow.add_step(step),
            Err(WorkflowError::DuplicateStep(id)) if id == "step1"
        ));
        assert_eq!(workflow.len(), 1);
    }

    #[test]
    fn test_workflow_root_steps() {
        let workflow = Workflow::from_steps(
            "test",
            vec![
                WorkflowStep::new("root", "WAIT"),
                WorkflowStep::new("leaf", "WAIT").depends_on("root"),
            ],
        );

        let roots = workflow.root_steps();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, "root");
    }

    #[test]
    fn test_workflow_default_is_empty() {
        let workflow = Workflow::default();
        assert!(workflow.is_empty());
        assert!(workflow.get_step("anything").is_none());
    }

    #[test]
    fn test_step_yaml_field_names() {
        let yaml = r#"
id: notify
action: SEND_EMAIL
payload:
  to: a@example.com
dependencies: [approve]
"#;
        let step: WorkflowStep = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.action_type, "SEND_EMAIL");
        assert_eq!(step.payload["to"], "a@example.com");
        assert_eq!(step.dependency_names(), ["approve"]);
    }

    #[test]
    fn test_yaml_and_builder_names_are_trimmed_alike() {
        let yaml = "id: ' notify '\naction: ' SEND_EMAIL'\ndependencies: [' approve ']\n";
        let parsed: WorkflowStep = serde_yaml::from_str(yaml).unwrap();
        let built = WorkflowStep::new("notify ", "SEND_EMAIL ").depends_on(" approve");

        assert_eq!(parsed, built);
        assert_eq!(parsed.id, "notify");
        assert_eq!(parsed.dependency_names(), ["approve"]);
    }

    #[test]
    fn test_step_without_payload_defaults_to_null() {
        let step: WorkflowStep = serde_yaml::from_str("id: a\naction: WAIT\n").unwrap();
        assert_eq!(step.payload, Value::Null);
        assert!(step.dependencies.is_none());
    }
}
