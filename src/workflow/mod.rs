//! Workflow Definition Module
//!
//! Provides data structures and utilities for defining, parsing, and
//! validating workflows.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (WorkflowStep, Workflow)
//! - [`parser`]: YAML loading and saving
//! - [`validator`]: Definition checks

pub mod model;
pub mod parser;
pub mod validator;

pub use model::{Workflow, WorkflowStep};
pub use parser::{load_workflow, parse_workflow, save_workflow};
pub use validator::{validate_workflow, ValidationError};
