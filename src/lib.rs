//! DagFlow - DAG Workflow Orchestrator
//!
//! Executes a set of named steps that declare dependencies on one another.
//! Steps whose dependencies are satisfied run concurrently, successes
//! release their dependents as soon as they complete, and a failure blocks
//! every step downstream of it.
//!
//! # Architecture
//!
//! The library is organized into these modules:
//!
//! - [`graph`]: Dependency graph with cycle rejection and cascading failure
//! - [`actions`]: Action handlers and the registry that dispatches to them
//! - [`workflow`]: Data structures and parsing for workflow definitions
//! - [`execution`]: Graph construction and the concurrent run driver
//! - [`monitoring`]: Execution timeline
//! - [`report`]: Completion report and its renderers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dagflow::{load_workflow, ActionRegistry, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load a workflow from YAML
//!     let workflow = load_workflow("demos/grant_approval.yaml")?;
//!
//!     // Run it against the stock actions
//!     let registry = Arc::new(ActionRegistry::with_builtins());
//!     let mut orchestrator = Orchestrator::new(workflow, registry);
//!     orchestrator.set_max_parallel(Some(4));
//!
//!     let report = orchestrator.run().await;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod error;
pub mod execution;
pub mod graph;
pub mod monitoring;
pub mod report;
pub mod workflow;

// Re-export commonly used types
pub use actions::{ActionHandler, ActionRegistry, ActionStatus};
pub use error::{ActionError, GraphError, WorkflowError};
pub use execution::Orchestrator;
pub use graph::DependencyGraph;
pub use report::WorkflowReport;
pub use workflow::model::{Workflow, WorkflowStep};
pub use workflow::parser::load_workflow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "DagFlow";
