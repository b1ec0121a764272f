//! Action Registry
//!
//! Maps action type identifiers to handlers. A registry is an explicit
//! instance handed to the orchestrator, so tests can swap in fakes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionError;

/// Outcome reported by an action handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Success,
    Failure,
}

/// Performs the side effect behind one action type.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use dagflow::actions::{ActionHandler, ActionStatus};
/// use dagflow::error::ActionError;
/// use serde_json::Value;
///
/// struct Noop;
///
/// #[async_trait]
/// impl ActionHandler for Noop {
///     fn action_type(&self) -> &str {
///         "NOOP"
///     }
///
///     async fn handle(&self, _payload: &Value) -> Result<ActionStatus, ActionError> {
///         Ok(ActionStatus::Success)
///     }
/// }
/// ```
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Identifier used for registration and lookup
    fn action_type(&self) -> &str;

    /// Runs the action.
    ///
    /// `Ok(ActionStatus::Failure)` is a reported failure and cascades to
    /// dependents. `Err` means the handler could not run at all.
    async fn handle(&self, payload: &Value) -> Result<ActionStatus, ActionError>;
}

/// Registry of action handlers keyed by action type.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any previous handler of the same type.
    pub fn register<H: ActionHandler + 'static>(&mut self, handler: H) {
        self.register_arc(Arc::new(handler));
    }

    /// Registers a shared handler.
    pub fn register_arc(&mut self, handler: Arc<dyn ActionHandler>) {
        let action_type = handler.action_type().to_string();
        self.handlers.insert(action_type, handler);
    }

    pub fn has_action(&self, action_type: &str) -> bool {
        self.handlers.contains_key(action_type)
    }

    /// Registered action types, sorted.
    pub fn action_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Invokes the handler registered for `action_type`.
    ///
    /// An unregistered action type is reported as
    /// [`ActionStatus::Failure`].
    pub async fn invoke(
        &self,
        action_type: &str,
        payload: &Value,
    ) -> Result<ActionStatus, ActionError> {
        match self.handlers.get(action_type) {
            Some(handler) => handler.handle(payload).await,
            None => {
                error!("Action type '{}' is not registered", action_type);
                Ok(ActionStatus::Failure)
            }
        }
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("action_types", &self.action_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed {
        name: &'static str,
        status: ActionStatus,
    }

    #[async_trait]
    impl ActionHandler for Fixed {
        fn action_type(&self) -> &str {
            self.name
        }

        async fn handle(&self, _payload: &Value) -> Result<ActionStatus, ActionError> {
            Ok(self.status)
        }
    }

    struct Broken;

    #[async_trait]
    impl ActionHandler for Broken {
        fn action_type(&self) -> &str {
            "BROKEN"
        }

        async fn handle(&self, _payload: &Value) -> Result<ActionStatus, ActionError> {
            Err(ActionError::Invocation {
                action_type: "BROKEN".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_invoke_registered_handler() {
        let mut registry = ActionRegistry::new();
        registry.register(Fixed {
            name: "OK",
            status: ActionStatus::Success,
        });
        registry.register(Fixed {
            name: "NOPE",
            status: ActionStatus::Failure,
        });

        let payload = json!({});
        assert_eq!(registry.invoke("OK", &payload).await.unwrap(), ActionStatus::Success);
        assert_eq!(registry.invoke("NOPE", &payload).await.unwrap(), ActionStatus::Failure);
    }

    #[tokio::test]
    async fn test_unregistered_action_is_failure() {
        let registry = ActionRegistry::new();
        let status = registry.invoke("SEND_FAX", &json!(null)).await.unwrap();
        assert_eq!(status, ActionStatus::Failure);
    }

    #[tokio::test]
    async fn test_handler_error_is_propagated() {
        let mut registry = ActionRegistry::new();
        registry.register(Broken);

        let result = registry.invoke("BROKEN", &json!({})).await;
        assert!(matches!(result, Err(ActionError::Invocation { .. })));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ActionRegistry::new();
        registry.register(Fixed {
            name: "OK",
            status: ActionStatus::Failure,
        });
        registry.register(Fixed {
            name: "OK",
            status: ActionStatus::Success,
        });

        assert_eq!(registry.action_types(), vec!["OK"]);
        assert!(registry.has_action("OK"));
        assert!(!registry.has_action("ok"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&ActionStatus::Success).unwrap(), "\"SUCCESS\"");
        assert_eq!(serde_json::to_string(&ActionStatus::Failure).unwrap(), "\"FAILURE\"");
    }
}
