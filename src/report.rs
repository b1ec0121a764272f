//! Completion Report
//!
//! The structured result of a workflow run and the reporters that render
//! it for humans (colored console text) or machines (JSON).

use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::error::GraphError;
use crate::graph::{BlockedStep, DependencyGraph, NodeStatus};
use crate::monitoring::ExecutionTimeline;

/// A step whose action could not be invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErroredStep {
    pub step: String,
    pub message: String,
}

/// An edge skipped while building the graph because it closed a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEdge {
    pub dependent: String,
    pub dependency: String,
}

impl From<&GraphError> for RejectedEdge {
    fn from(error: &GraphError) -> Self {
        match error {
            GraphError::CycleRejected {
                dependent,
                dependency,
            } => Self {
                dependent: dependent.clone(),
                dependency: dependency.clone(),
            },
        }
    }
}

/// Final state of a workflow run.
///
/// Every step lands in exactly one of `finished`, `failed`, `errored`,
/// `missing` or `unreached`, or has at least one entry in `blocked`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub workflow: String,
    /// Steps that completed successfully
    pub finished: Vec<String>,
    /// Steps whose action reported failure
    pub failed: Vec<String>,
    /// (step, failed ancestor) pairs
    pub blocked: Vec<BlockedStep>,
    /// Steps whose action could not be invoked
    pub errored: Vec<ErroredStep>,
    /// Ready steps with no definition in the workflow
    pub missing: Vec<String>,
    /// Steps that never became ready for any other reason
    pub unreached: Vec<String>,
    pub rejected_edges: Vec<RejectedEdge>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(skip)]
    pub timeline: ExecutionTimeline,
}

impl WorkflowReport {
    /// Assembles the report from the final graph state.
    pub fn from_graph(
        workflow: &str,
        graph: &DependencyGraph,
        mut errored: Vec<ErroredStep>,
        mut missing: Vec<String>,
        rejected_edges: &[GraphError],
        timeline: ExecutionTimeline,
        started_at: DateTime<Utc>,
    ) -> Self {
        errored.sort_by(|a, b| a.step.cmp(&b.step));
        missing.sort();

        let blocked_steps: BTreeSet<&str> =
            graph.blocked().iter().map(|b| b.step.as_str()).collect();
        let unreached = graph
            .node_names()
            .into_iter()
            .filter(|name| graph.status(name) == Some(NodeStatus::Pending))
            .filter(|name| !blocked_steps.contains(name))
            .filter(|name| !errored.iter().any(|e| e.step == *name))
            .filter(|name| !missing.iter().any(|m| m == name))
            .map(str::to_string)
            .collect();

        Self {
            workflow: workflow.to_string(),
            finished: graph.finished().iter().cloned().collect(),
            failed: graph.failed().iter().cloned().collect(),
            blocked: graph.blocked().iter().cloned().collect(),
            errored,
            missing,
            unreached,
            rejected_edges: rejected_edges.iter().map(RejectedEdge::from).collect(),
            started_at,
            finished_at: Utc::now(),
            timeline,
        }
    }

    /// Returns true if every step finished and no edge was rejected.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
            && self.blocked.is_empty()
            && self.errored.is_empty()
            && self.missing.is_empty()
            && self.unreached.is_empty()
            && self.rejected_edges.is_empty()
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Steps that were blocked, each listed once.
    pub fn blocked_steps(&self) -> Vec<&str> {
        let steps: BTreeSet<&str> = self.blocked.iter().map(|b| b.step.as_str()).collect();
        steps.into_iter().collect()
    }

    fn duration_secs(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 1000.0
    }
}

impl fmt::Display for WorkflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Workflow '{}' completed in {:.2}s",
            self.workflow,
            self.duration_secs()
        )?;
        writeln!(f, "Finished successfully: {}", list(&self.finished))?;
        if !self.failed.is_empty() {
            writeln!(f, "Failed: {}", list(&self.failed))?;
        }
        if !self.blocked.is_empty() {
            writeln!(f, "Blocked by failed steps:")?;
            for blocked in &self.blocked {
                writeln!(f, "  {}", blocked)?;
            }
        }
        for errored in &self.errored {
            writeln!(f, "Errored: {} ({})", errored.step, errored.message)?;
        }
        if !self.missing.is_empty() {
            writeln!(f, "Missing step definitions: {}", list(&self.missing))?;
        }
        if !self.unreached.is_empty() {
            writeln!(f, "Never reached: {}", list(&self.unreached))?;
        }
        for edge in &self.rejected_edges {
            writeln!(f, "Rejected edge: {} -> {}", edge.dependent, edge.dependency)?;
        }
        Ok(())
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Renders a finished run.
pub trait Reporter {
    fn report(&self, report: &WorkflowReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Human-readable summary with colored section headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter {
    /// Append an ASCII Gantt chart of the run
    pub show_timeline: bool,
}

impl Reporter for ConsoleReporter {
    fn report(&self, report: &WorkflowReport, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        let headline = format!(
            "Workflow '{}' completed in {:.2}s",
            report.workflow,
            report.duration_secs()
        );
        if report.is_success() {
            writeln!(out, "{}", headline.green().bold())?;
        } else {
            writeln!(out, "{}", headline.yellow().bold())?;
        }

        writeln!(out, "{}", "Finished successfully:".green())?;
        for step in &report.finished {
            writeln!(out, "  {}", step)?;
        }

        if !report.failed.is_empty() {
            writeln!(out, "{}", "Failed:".red())?;
            for step in &report.failed {
                writeln!(out, "  {}", step)?;
            }
        }

        if !report.blocked.is_empty() {
            writeln!(out, "{}", "Blocked by failed steps:".red())?;
            for blocked in &report.blocked {
                writeln!(out, "  {}", blocked)?;
            }
        }

        if !report.errored.is_empty() {
            writeln!(out, "{}", "Could not be invoked:".magenta())?;
            for errored in &report.errored {
                writeln!(out, "  {}: {}", errored.step, errored.message)?;
            }
        }

        if !report.missing.is_empty() {
            writeln!(out, "{}", "Missing step definitions:".magenta())?;
            for step in &report.missing {
                writeln!(out, "  {}", step)?;
            }
        }

        if !report.unreached.is_empty() {
            writeln!(out, "{}", "Never reached:".yellow())?;
            for step in &report.unreached {
                writeln!(out, "  {}", step)?;
            }
        }

        if !report.rejected_edges.is_empty() {
            writeln!(out, "{}", "Rejected dependencies (would create a cycle):".yellow())?;
            for edge in &report.rejected_edges {
                writeln!(out, "  {} -> {}", edge.dependent, edge.dependency)?;
            }
        }

        if self.show_timeline {
            write!(out, "{}", report.timeline.gantt_chart())?;
        }
        Ok(())
    }
}

/// Machine-readable report.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReporter {
    pub pretty: bool,
}

impl Reporter for JsonReporter {
    fn report(&self, report: &WorkflowReport, out: &mut dyn Write) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, report)?;
        } else {
            serde_json::to_writer(&mut *out, report)?;
        }
        writeln!(out)
    }
}
