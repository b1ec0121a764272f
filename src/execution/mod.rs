//! Workflow Execution Module
//!
//! Turns graph readiness into concurrent step invocations.
//!
//! # Architecture
//!
//! - [`orchestrator`]: Graph construction and the run driver
//! - `chain`: Execution of a single ready step

mod chain;
pub mod orchestrator;

pub use orchestrator::{build_graph, Orchestrator};
