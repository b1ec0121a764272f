//! Action Invocation Module
//!
//! The capability that performs a step's side effect and reports
//! Success or Failure.
//!
//! - [`registry`]: Handler trait and registry
//! - [`builtin`]: Stock SEND_EMAIL, UPDATE_GRANT and WAIT handlers

pub mod builtin;
pub mod registry;

pub use builtin::{GrantStatus, SendEmail, UpdateGrant, Wait, SEND_EMAIL, UPDATE_GRANT, WAIT};
pub use registry::{ActionHandler, ActionRegistry, ActionStatus};
