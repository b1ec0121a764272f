//! Workflow Orchestrator
//!
//! Builds a [`DependencyGraph`] from a workflow and drives it to
//! completion:
//! - Every initially pending step starts at once
//! - Each success starts the steps it released, without waiting on siblings
//! - Each failure blocks its transitive dependents
//! - The run ends when no execution chain is in flight

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::actions::ActionRegistry;
use crate::error::GraphError;
use crate::graph::DependencyGraph;
use crate::monitoring::{EventType, ExecutionTimeline};
use crate::report::{ErroredStep, WorkflowReport};
use crate::workflow::{Workflow, WorkflowStep};

use super::chain::{run_chain, ChainOutcome, ChainResult, ExecutionContext};

/// Builds the dependency graph for a workflow.
///
/// Steps with dependencies contribute one edge per dependency; steps
/// without any are added as independent nodes. Edges that would close a
/// cycle are skipped and returned alongside the graph.
pub fn build_graph(workflow: &Workflow) -> (DependencyGraph, Vec<GraphError>) {
    let mut graph = DependencyGraph::new();
    let mut rejected = Vec::new();

    for step in &workflow.steps {
        if step.is_independent() {
            graph.add_node(&step.id, true);
            continue;
        }
        for dependency in step.dependency_names() {
            if let Err(e) = graph.add_edge(&step.id, dependency) {
                rejected.push(e);
            }
        }
    }

    info!(
        "Built graph for '{}': {} nodes, {} initially ready, {} edges rejected",
        workflow.name,
        graph.len(),
        graph.pending().len(),
        rejected.len()
    );
    (graph, rejected)
}

/// Runs a workflow with maximal parallelism.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use dagflow::actions::ActionRegistry;
/// use dagflow::execution::Orchestrator;
/// use dagflow::load_workflow;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let workflow = load_workflow("demos/grant_approval.yaml")?;
///     let registry = Arc::new(ActionRegistry::with_builtins());
///
///     let report = Orchestrator::new(workflow, registry).run().await;
///     println!("{}", report);
///     Ok(())
/// }
/// ```
pub struct Orchestrator {
    workflow_name: String,
    steps: Arc<HashMap<String, Arc<WorkflowStep>>>,
    graph: Arc<Mutex<DependencyGraph>>,
    registry: Arc<ActionRegistry>,
    rejected_edges: Vec<GraphError>,
    max_parallel: Option<usize>,
    dry_run: bool,
}

impl Orchestrator {
    /// Creates an orchestrator and builds the workflow's graph.
    pub fn new(workflow: Workflow, registry: Arc<ActionRegistry>) -> Self {
        let (graph, rejected_edges) = build_graph(&workflow);
        let steps = workflow
            .steps
            .into_iter()
            .map(|step| (step.id.clone(), Arc::new(step)))
            .collect();

        Self {
            workflow_name: workflow.name,
            steps: Arc::new(steps),
            graph: Arc::new(Mutex::new(graph)),
            registry,
            rejected_edges,
            max_parallel: None,
            dry_run: false,
        }
    }

    /// Bounds the number of actions running at once. `None` or `Some(0)`
    /// means unbounded.
    pub fn set_max_parallel(&mut self, max: Option<usize>) {
        self.max_parallel = max.filter(|n| *n > 0);
    }

    /// Enables or disables dry run mode (every step succeeds without
    /// invoking its action).
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    /// Edges rejected while building the graph.
    pub fn rejected_edges(&self) -> &[GraphError] {
        &self.rejected_edges
    }

    /// Returns a copy of the current graph state.
    pub async fn graph_snapshot(&self) -> DependencyGraph {
        self.graph.lock().await.clone()
    }

    /// Executes the workflow and returns the completion report.
    ///
    /// Steps stuck behind a failure, an invocation error or a missing
    /// definition do not keep the run alive: it ends once nothing is left
    /// in flight, and the report lists them.
    pub async fn run(self) -> WorkflowReport {
        let started_at = Utc::now();
        let mut timeline = ExecutionTimeline::new();

        let ctx = ExecutionContext {
            steps: Arc::clone(&self.steps),
            graph: Arc::clone(&self.graph),
            registry: Arc::clone(&self.registry),
            limiter: self.max_parallel.map(|n| Arc::new(Semaphore::new(n))),
            dry_run: self.dry_run,
        };

        info!(
            "Running workflow '{}' (max parallel: {}, dry run: {})",
            self.workflow_name,
            self.max_parallel
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
            self.dry_run
        );

        let initial: Vec<String> = ctx.graph.lock().await.pending().iter().cloned().collect();

        let mut chains: JoinSet<ChainOutcome> = JoinSet::new();
        let mut dispatched: HashSet<String> = HashSet::new();
        for step in initial {
            dispatch(&mut chains, &mut dispatched, &ctx, step);
        }

        let mut errored = Vec::new();
        let mut missing = Vec::new();

        while let Some(joined) = chains.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Execution chain aborted: {}", e);
                    continue;
                }
            };

            if let Some(started) = outcome.started_at {
                timeline.add_event_at(&outcome.step, EventType::Started, started);
            }

            match outcome.result {
                ChainResult::Done { newly_ready } => {
                    timeline.add_event_at(&outcome.step, EventType::Completed, outcome.ended_at);
                    for next in newly_ready {
                        dispatch(&mut chains, &mut dispatched, &ctx, next);
                    }
                }
                ChainResult::Failed { blocked } => {
                    timeline.add_event_at(&outcome.step, EventType::Failed, outcome.ended_at);
                    if !blocked.is_empty() {
                        warn!(
                            "Failure of '{}' blocks: {}",
                            outcome.step,
                            blocked.join(", ")
                        );
                    }
                }
                ChainResult::Errored(e) => {
                    timeline.add_event_at(&outcome.step, EventType::Errored, outcome.ended_at);
                    errored.push(ErroredStep {
                        step: outcome.step,
                        message: e.to_string(),
                    });
                }
                ChainResult::Missing => missing.push(outcome.step),
            }
        }

        let graph = ctx.graph.lock().await;
        let report = WorkflowReport::from_graph(
            &self.workflow_name,
            &graph,
            errored,
            missing,
            &self.rejected_edges,
            timeline,
            started_at,
        );

        info!(
            "Workflow '{}' completed: {} finished, {} failed, {} blocked",
            report.workflow,
            report.finished.len(),
            report.failed.len(),
            report.blocked.len()
        );
        report
    }
}

/// Starts a chain for `step` unless one was already started.
fn dispatch(
    chains: &mut JoinSet<ChainOutcome>,
    dispatched: &mut HashSet<String>,
    ctx: &ExecutionContext,
    step: String,
) {
    if !dispatched.insert(step.clone()) {
        warn!("Step '{}' was already dispatched", step);
        return;
    }
    chains.spawn(run_chain(ctx.clone(), step));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wait(id: &str, deps: &[&str]) -> WorkflowStep {
        deps.iter().fold(
            WorkflowStep::new(id, "WAIT").with_payload(json!({ "wait_time_seconds": 0.01 })),
            |s, d| s.depends_on(*d),
        )
    }

    fn loop_workflow() -> Workflow {
        Workflow::from_steps(
            "loop",
            vec![
                wait("wait1", &["wait2"]),
                wait("wait2", &["wait3"]),
                wait("wait3", &["wait1"]),
                wait("wait4", &[]),
            ],
        )
    }

    #[test]
    fn test_build_graph_rejects_cycle_and_continues() {
        let (graph, rejected) = build_graph(&loop_workflow());

        assert_eq!(
            rejected,
            vec![GraphError::CycleRejected {
                dependent: "wait3".to_string(),
                dependency: "wait1".to_string(),
            }]
        );
        assert_eq!(graph.len(), 4);
        assert!(graph.node("wait1").unwrap().dependencies().contains("wait2"));
        assert!(graph.node("wait2").unwrap().dependencies().contains("wait3"));
        assert!(graph.node("wait3").unwrap().dependencies().is_empty());
        let pending: Vec<&String> = graph.pending().iter().collect();
        assert_eq!(pending, vec!["wait3", "wait4"]);
    }

    #[test]
    fn test_build_graph_creates_undeclared_dependencies() {
        let workflow = Workflow::from_steps("dangling", vec![wait("a", &["ghost"])]);
        let (graph, rejected) = build_graph(&workflow);

        assert!(rejected.is_empty());
        assert!(graph.contains("ghost"));
        assert!(graph.pending().contains("ghost"));
    }

    #[test]
    fn test_orchestrator_configuration() {
        let registry = Arc::new(ActionRegistry::with_builtins());
        let mut orchestrator = Orchestrator::new(loop_workflow(), registry);

        assert_eq!(orchestrator.max_parallel, None);
        assert!(!orchestrator.dry_run);
        assert_eq!(orchestrator.rejected_edges().len(), 1);

        orchestrator.set_max_parallel(Some(2));
        orchestrator.set_dry_run(true);
        assert_eq!(orchestrator.max_parallel, Some(2));
        assert!(orchestrator.dry_run);

        orchestrator.set_max_parallel(Some(0));
        assert_eq!(orchestrator.max_parallel, None);
    }

    #[tokio::test]
    async fn test_loop_workflow_runs_remaining_chain() {
        let registry = Arc::new(ActionRegistry::with_builtins());
        let report = Orchestrator::new(loop_workflow(), registry).run().await;

        assert_eq!(report.finished, vec!["wait1", "wait2", "wait3", "wait4"]);
        assert_eq!(report.rejected_edges.len(), 1);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_bounded_parallelism_completes() {
        let steps = (0..6).map(|i| wait(&format!("w{}", i), &[])).collect();
        let registry = Arc::new(ActionRegistry::with_builtins());
        let mut orchestrator = Orchestrator::new(Workflow::from_steps("wide", steps), registry);
        orchestrator.set_max_parallel(Some(2));

        let report = orchestrator.run().await;
        assert_eq!(report.finished.len(), 6);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_graph_snapshot_before_run() {
        let registry = Arc::new(ActionRegistry::with_builtins());
        let orchestrator = Orchestrator::new(loop_workflow(), registry);

        let snapshot = orchestrator.graph_snapshot().await;
        assert!(snapshot.finished().is_empty());
        assert_eq!(snapshot.pending().len(), 2);
    }
}
