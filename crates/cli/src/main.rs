//! DevPlan CLI - deterministic task execution planner.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use devplan_core::{DiagnosticSeverity, ExecutionPlan};
use devplan_execution::{Planner, PlannerConfig};
use devplan_extract::{discover_tasks, find_project_root, Discovery, ExtractConfig};
use devplan_storage::{default_plan_path, JsonPlanStore, PlanDocument, PlanStore};

#[derive(Parser)]
#[command(name = "devplan")]
#[command(about = "Deterministic task execution planner", long_about = None)]
struct Cli {
    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the execution plan and write it to disk
    Analyze {
        #[command(flatten)]
        plan: PlanArgs,
        /// Output file (default: <root>/.factory/execution_graph.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the parallel groups without writing anything
    Show {
        #[command(flatten)]
        plan: PlanArgs,
    },
}

#[derive(Args)]
struct PlanArgs {
    /// Project root (default: nearest ancestor holding .factory)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Only plan tasks of this phase
    #[arg(long)]
    phase: Option<String>,
    /// Upper bound on estimated concurrency per group
    #[arg(long, default_value = "5")]
    concurrency_cap: NonZeroUsize,
    /// Fail when the dependencies contain a cycle
    #[arg(long)]
    strict: bool,
}

struct Planned {
    root: PathBuf,
    discovery: Discovery,
    plan: ExecutionPlan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze { plan, output } => {
            let planned = build_plan(&plan).await?;
            let path = output.unwrap_or_else(|| default_plan_path(&planned.root));

            let document = PlanDocument::new(&planned.plan, &planned.discovery.registry);
            let mut store = JsonPlanStore::new(&path);
            store
                .save(&document)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Wrote execution plan");

            let summary = &planned.plan.summary;
            println!("Execution plan ({})", planned.plan.phase_label());
            println!("  Total tasks: {}", summary.total_tasks);
            println!("  Parallel groups: {}", summary.parallel_groups);
            println!("  Parallelizable tasks: {}", summary.parallelizable_tasks);
            println!("  Sequential tasks: {}", summary.sequential_tasks);
            println!("  Output: {}", path.display());
            print_notices(&planned, !cli.quiet);
        }
        Commands::Show { plan } => {
            let planned = build_plan(&plan).await?;

            println!("Execution plan ({})", planned.plan.phase_label());
            if planned.plan.groups.is_empty() {
                println!("  No tasks");
            }
            for group in &planned.plan.groups {
                let members: Vec<_> = group.members.iter().map(|id| id.as_str()).collect();
                println!(
                    "  {} [{} agent{}]: {}",
                    group.id,
                    group.estimated_concurrency,
                    if group.estimated_concurrency == 1 { "" } else { "s" },
                    members.join(", "),
                );
            }
            print_notices(&planned, !cli.quiet);
        }
    }

    Ok(())
}

async fn build_plan(args: &PlanArgs) -> Result<Planned> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => find_project_root(&std::env::current_dir()?),
    };

    let discovery = discover_tasks(&root, &ExtractConfig::default())
        .await
        .with_context(|| format!("scanning {}", root.display()))?;

    let mut config = PlannerConfig::new().with_concurrency_cap(args.concurrency_cap);
    if let Some(phase) = &args.phase {
        config = config.with_phase(phase.as_str());
    }
    let plan = Planner::new(config).plan(&discovery.registry);

    if args.strict {
        plan.ensure_acyclic()?;
    }

    Ok(Planned { root, discovery, plan })
}

fn print_notices(planned: &Planned, verbose: bool) {
    let dropped = planned
        .plan
        .diagnostics
        .iter()
        .filter(|d| d.severity() == DiagnosticSeverity::Info)
        .count();
    if dropped > 0 {
        info!(count = dropped, "Dropped unresolved dependency references");
    }

    for line in notice_lines(planned, verbose) {
        println!("{}", line);
    }
}

/// Report lines for diagnostics and skipped documents. Dropped
/// references are listed one by one only when `verbose`.
fn notice_lines(planned: &Planned, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut dropped = Vec::new();
    for diagnostic in &planned.plan.diagnostics {
        match diagnostic.severity() {
            DiagnosticSeverity::Warning => lines.push(format!("  Warning: {}", diagnostic)),
            DiagnosticSeverity::Info => dropped.push(format!("  Note: {}", diagnostic)),
        }
    }
    if !dropped.is_empty() {
        lines.push(format!("  Dropped references: {}", dropped.len()));
        if verbose {
            lines.extend(dropped);
        }
    }
    for skipped in &planned.discovery.skipped {
        lines.push(format!("  Skipped {}: {}", skipped.path.display(), skipped.error));
    }
    for path in &planned.discovery.duplicates {
        lines.push(format!("  Duplicate task document ignored: {}", path.display()));
    }
    lines
}
