//! Built-in Actions
//!
//! Handlers for the stock grant-approval actions:
//!
//! | Action type    | Payload                                        |
//! |----------------|------------------------------------------------|
//! | `SEND_EMAIL`   | `to`, `subject`, `body`                        |
//! | `UPDATE_GRANT` | `grant_id`, `status` (pending/approved/rejected) |
//! | `WAIT`         | `wait_time_seconds`                            |
//!
//! Every payload accepts `simulate_failure: true`, which makes the handler
//! report [`ActionStatus::Failure`] without performing its side effect.
//! The camel-case `grantId` and the `testing_fail` flag are accepted as
//! aliases.

use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionError;

use super::registry::{ActionHandler, ActionRegistry, ActionStatus};

pub const SEND_EMAIL: &str = "SEND_EMAIL";
pub const UPDATE_GRANT: &str = "UPDATE_GRANT";
pub const WAIT: &str = "WAIT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailPayload {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default, alias = "testing_fail")]
    pub simulate_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantStatus::Pending => write!(f, "pending"),
            GrantStatus::Approved => write!(f, "approved"),
            GrantStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGrantPayload {
    #[serde(alias = "grantId")]
    pub grant_id: String,
    pub status: GrantStatus,
    #[serde(default, alias = "testing_fail")]
    pub simulate_failure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitPayload {
    pub wait_time_seconds: f64,
    #[serde(default, alias = "testing_fail")]
    pub simulate_failure: bool,
}

fn parse_payload<T: DeserializeOwned>(action_type: &str, payload: &Value) -> Result<T, ActionError> {
    T::deserialize(payload).map_err(|source| ActionError::InvalidPayload {
        action_type: action_type.to_string(),
        source,
    })
}

/// Sends a notification email.
pub struct SendEmail;

#[async_trait]
impl ActionHandler for SendEmail {
    fn action_type(&self) -> &str {
        SEND_EMAIL
    }

    async fn handle(&self, payload: &Value) -> Result<ActionStatus, ActionError> {
        let email: SendEmailPayload = parse_payload(SEND_EMAIL, payload)?;
        if email.simulate_failure {
            error!("Email '{}' to {} failed (simulated)", email.subject, email.to);
            return Ok(ActionStatus::Failure);
        }

        info!("Email sent to {}: {} - {}", email.to, email.subject, email.body);
        Ok(ActionStatus::Success)
    }
}

/// Moves a grant to a new status.
pub struct UpdateGrant;

#[async_trait]
impl ActionHandler for UpdateGrant {
    fn action_type(&self) -> &str {
        UPDATE_GRANT
    }

    async fn handle(&self, payload: &Value) -> Result<ActionStatus, ActionError> {
        let update: UpdateGrantPayload = parse_payload(UPDATE_GRANT, payload)?;
        if update.simulate_failure {
            error!("Update of grant '{}' failed (simulated)", update.grant_id);
            return Ok(ActionStatus::Failure);
        }

        info!("Grant '{}' set to {}", update.grant_id, update.status);
        Ok(ActionStatus::Success)
    }
}

/// Sleeps for a fixed time.
pub struct Wait;

#[async_trait]
impl ActionHandler for Wait {
    fn action_type(&self) -> &str {
        WAIT
    }

    async fn handle(&self, payload: &Value) -> Result<ActionStatus, ActionError> {
        let wait: WaitPayload = parse_payload(WAIT, payload)?;
        if wait.simulate_failure {
            error!("Wait of {}s failed (simulated)", wait.wait_time_seconds);
            return Ok(ActionStatus::Failure);
        }

        let duration = Duration::try_from_secs_f64(wait.wait_time_seconds).map_err(|e| {
            ActionError::Invocation {
                action_type: WAIT.to_string(),
                message: e.to_string(),
            }
        })?;

        info!("Waiting {}s", wait.wait_time_seconds);
        tokio::time::sleep(duration).await;
        info!("Done waiting {}s", wait.wait_time_seconds);
        Ok(ActionStatus::Success)
    }
}

impl ActionRegistry {
    /// Creates a registry with the built-in actions registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SendEmail);
        registry.register(UpdateGrant);
        registry.register(Wait);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;

    #[test]
    fn test_builtins_registered() {
        let registry = ActionRegistry::with_builtins();
        assert_eq!(registry.action_types(), vec![SEND_EMAIL, UPDATE_GRANT, WAIT]);
    }

    #[tokio::test]
    async fn test_send_email() {
        let payload = json!({
            "to": "recipient@example.com",
            "subject": "Workflow Notification",
            "body": "The workflow is done."
        });
        assert_eq!(SendEmail.handle(&payload).await.unwrap(), ActionStatus::Success);
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let payload = json!({
            "grant_id": "updateGrant1",
            "status": "approved",
            "simulate_failure": true
        });
        assert_eq!(UpdateGrant.handle(&payload).await.unwrap(), ActionStatus::Failure);
    }

    #[tokio::test]
    async fn test_legacy_field_names() {
        let payload = json!({ "grantId": "updateGrant1", "status": "approved" });
        assert_eq!(UpdateGrant.handle(&payload).await.unwrap(), ActionStatus::Success);

        let payload = json!({
            "grantId": "updateGrant1",
            "status": "approved",
            "testing_fail": true
        });
        assert_eq!(UpdateGrant.handle(&payload).await.unwrap(), ActionStatus::Failure);

        let payload = json!({ "wait_time_seconds": 0, "testing_fail": true });
        assert_eq!(Wait.handle(&payload).await.unwrap(), ActionStatus::Failure);
    }

    #[tokio::test]
    async fn test_invalid_grant_status() {
        let payload = json!({ "grant_id": "g1", "status": "archived" });
        let err = UpdateGrant.handle(&payload).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidPayload { .. }));
        assert!(err.to_string().contains("UPDATE_GRANT"));
    }

    #[tokio::test]
    async fn test_missing_payload_fields() {
        let err = SendEmail.handle(&json!({ "to": "x@example.com" })).await.unwrap_err();
        assert!(matches!(err, ActionError::InvalidPayload { .. }));
    }

    #[tokio::test]
    async fn test_wait_sleeps() {
        let start = Instant::now();
        let status = Wait
            .handle(&json!({ "wait_time_seconds": 0.05 }))
            .await
            .unwrap();

        assert_eq!(status, ActionStatus::Success);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_wait_negative_duration_is_invocation_error() {
        let err = Wait
            .handle(&json!({ "wait_time_seconds": -1.0 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Invocation { .. }));
    }

    #[test]
    fn test_grant_status_display() {
        assert_eq!(GrantStatus::Approved.to_string(), "approved");
        let parsed: GrantStatus = serde_json::from_value(json!("rejected")).unwrap();
        assert_eq!(parsed, GrantStatus::Rejected);
    }
}
