//! Execution Chain
//!
//! Runs one ready step: invokes its action, then reports the outcome to
//! the shared graph. The driver spawns a new chain for every step the
//! graph releases.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use tokio::sync::{Mutex, Semaphore};

use crate::actions::{ActionRegistry, ActionStatus};
use crate::error::ActionError;
use crate::graph::DependencyGraph;
use crate::workflow::WorkflowStep;

/// Shared state handed to every chain.
#[derive(Clone)]
pub(crate) struct ExecutionContext {
    pub steps: Arc<HashMap<String, Arc<WorkflowStep>>>,
    pub graph: Arc<Mutex<DependencyGraph>>,
    pub registry: Arc<ActionRegistry>,
    pub limiter: Option<Arc<Semaphore>>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub(crate) enum ChainResult {
    /// Marked done; carries the steps that became ready
    Done { newly_ready: Vec<String> },
    /// Marked failed; carries the steps now blocked
    Failed { blocked: Vec<String> },
    /// The action could not be invoked; the graph was not told
    Errored(ActionError),
    /// No step definition for this name
    Missing,
}

#[derive(Debug)]
pub(crate) struct ChainOutcome {
    pub step: String,
    pub result: ChainResult,
    pub started_at: Option<Instant>,
    pub ended_at: Instant,
}

/// Executes a single ready step and records the result in the graph.
///
/// - Success: `mark_done`, returning the released dependents.
/// - Failure: `mark_failed`, blocking every transitive dependent.
/// - Invocation error: logged only. The step stays pending and its
///   dependents never run.
pub(crate) async fn run_chain(ctx: ExecutionContext, step_name: String) -> ChainOutcome {
    let Some(step) = ctx.steps.get(&step_name).cloned() else {
        error!("Step with name '{}' not found", step_name);
        return ChainOutcome {
            step: step_name,
            result: ChainResult::Missing,
            started_at: None,
            ended_at: Instant::now(),
        };
    };

    // Held until the outcome is reported
    let _permit = match &ctx.limiter {
        Some(limiter) => limiter.clone().acquire_owned().await.ok(),
        None => None,
    };

    let started_at = Instant::now();
    info!("Starting step: {} ({})", step.id, step.action_type);

    let status = if ctx.dry_run {
        info!(
            "[DRY RUN] Step '{}' would run {} with payload {}",
            step.id, step.action_type, step.payload
        );
        Ok(ActionStatus::Success)
    } else {
        step.execute(&ctx.registry).await
    };
    let ended_at = Instant::now();

    let result = match status {
        Ok(ActionStatus::Success) => {
            let newly_ready = ctx.graph.lock().await.mark_done(&step_name);
            ChainResult::Done { newly_ready }
        }
        Ok(ActionStatus::Failure) => {
            let blocked = ctx.graph.lock().await.mark_failed(&step_name);
            error!("Step '{}' failed to execute", step_name);
            ChainResult::Failed { blocked }
        }
        Err(e) => {
            error!("Error executing step '{}': {}", step_name, e);
            ChainResult::Errored(e)
        }
    };

    ChainOutcome {
        step: step_name,
        result,
        started_at: Some(started_at),
        ended_at,
    }
}
