//! DagFlow CLI Entry Point
//!
//! Provides command-line interface for workflow execution.
//!
//! # Usage
//!
//! ```bash
//! # Execute a workflow
//! dagflow workflow.yaml
//!
//! # Dry run mode (every step succeeds without running its action)
//! dagflow workflow.yaml --dry-run
//!
//! # Limit concurrently running actions
//! dagflow workflow.yaml --parallel 4
//!
//! # Machine-readable report
//! dagflow workflow.yaml --json
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use dagflow::actions::ActionRegistry;
use dagflow::execution::Orchestrator;
use dagflow::report::{ConsoleReporter, JsonReporter, Reporter};
use dagflow::workflow::parser::load_workflow;
use dagflow::{APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Parser, Debug)]
#[command(author, version, about = "DAG workflow orchestrator", long_about = None)]
struct Cli {
    /// Path to workflow YAML file
    workflow: PathBuf,

    /// Maximum concurrently running actions (default: unbounded)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    parallel: Option<u64>,

    /// Report every step as successful without invoking its action
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Append an execution timeline to the console report
    #[arg(long)]
    timeline: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("DAG Workflow Orchestrator");
    println!();
}

/// Loads and runs the workflow. Returns whether every step finished.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    if !cli.json {
        print_banner();
    }

    if cli.dry_run {
        info!("Mode: DRY RUN (actions will not be invoked)");
    }

    let workflow = load_workflow(&cli.workflow).map_err(|e| {
        error!("Failed to load workflow: {}", e);
        format!(
            "Could not load workflow from '{}': {}",
            cli.workflow.display(),
            e
        )
    })?;

    info!(
        "Workflow loaded: '{}' with {} steps ({} without dependencies)",
        workflow.name,
        workflow.len(),
        workflow.root_steps().len()
    );

    let registry = Arc::new(ActionRegistry::with_builtins());
    let mut orchestrator = Orchestrator::new(workflow, registry);
    orchestrator.set_max_parallel(cli.parallel.map(|n| n as usize));
    orchestrator.set_dry_run(cli.dry_run);

    let report = orchestrator.run().await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        JsonReporter { pretty: true }.report(&report, &mut out)?;
    } else {
        ConsoleReporter {
            show_timeline: cli.timeline,
        }
        .report(&report, &mut out)?;
    }

    Ok(report.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
