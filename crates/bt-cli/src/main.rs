//! treely - run declarative behavior trees from the command line.
//!
//! - `treely run <file>` - assemble a tree and tick it
//! - `treely check <file>` - assemble a tree and print its layout

mod builtins;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

use bt_tools::{TraceLog, TRACE_LOG};
use bt_tree::{BehaviorTree, NodeDeclaration, Ticker, TreeConfig, TreeRegistry};

#[derive(Parser)]
#[command(name = "treely")]
#[command(about = "Declarative behavior tree runner", version)]
struct Cli {
    /// Runtime configuration file
    #[arg(short, long, global = true, default_value = "treely.yaml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick a tree until it stops
    Run {
        /// Tree description (JSON)
        file: PathBuf,

        /// Tick this many times back to back instead of on an interval
        #[arg(long, conflicts_with = "interval")]
        ticks: Option<u64>,

        /// Seconds between ticks
        #[arg(long)]
        interval: Option<f64>,

        /// Seed for random composites and the `coin` action
        #[arg(long)]
        seed: Option<u64>,

        /// Print the per-node trace after the run
        #[arg(long)]
        trace: bool,
    },

    /// Validate a tree without running it
    Check {
        /// Tree description (JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            file,
            ticks,
            interval,
            seed,
            trace,
        } => {
            let mut config = TreeConfig::load_or_default(&cli.config)?;
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(interval) = interval {
                if !(interval.is_finite() && interval > 0.0) {
                    bail!("--interval must be a positive number of seconds, got {interval}");
                }
                config.tick_interval_secs = interval;
            }
            if ticks.is_some() {
                config.max_ticks = ticks;
            }
            config.trace |= trace;
            run_tree(&file, &config).await
        }
        Commands::Check { file } => check_tree(&file),
    }
}

fn load_declaration(file: &Path) -> Result<NodeDeclaration> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read tree from {}", file.display()))?;
    NodeDeclaration::from_json(&json)
        .with_context(|| format!("Failed to parse tree from {}", file.display()))
}

async fn run_tree(file: &Path, config: &TreeConfig) -> Result<()> {
    let declaration = load_declaration(file)?;
    let mut tree = BehaviorTree::new(&declaration, Arc::new(builtins::registry()))
        .with_context(|| format!("Failed to assemble tree from {}", file.display()))?
        .with_config(config);
    if let Some(seed) = config.seed {
        builtins::seed_coin(tree.blackboard_mut(), seed);
    }

    tracing::info!(
        tree = %file.display(),
        nodes = tree.registry().len(),
        "Starting tree"
    );

    match config.max_ticks {
        Some(max) => {
            let ticks = tree.run_ticks(max).context("Tick failed")?;
            tracing::info!(ticks, stopped = tree.is_stopped(), "Finished ticking");
            print_report(&tree, config.trace);
        }
        None => {
            let shared = Arc::new(Mutex::new(tree));
            let handle = Ticker::start(shared.clone(), config.tick_interval());
            let report = handle
                .join_until(async {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %err, "Failed to listen for ctrl-c");
                        std::future::pending::<()>().await;
                    }
                })
                .await;
            tracing::info!(
                ticks = report.ticks,
                failed = report.failed_ticks,
                exit = ?report.exit,
                "Ticker finished"
            );
            if let Some(err) = &report.last_error {
                tracing::warn!(error = %err, "Last tick error");
            }
            print_report(&shared.lock(), config.trace);
        }
    }
    Ok(())
}

fn print_report(tree: &BehaviorTree, trace: bool) {
    print_summary(tree);
    if trace {
        print_trace(tree);
    }
}

fn check_tree(file: &Path) -> Result<()> {
    let declaration = load_declaration(file)?;
    let registry = bt_tree::assemble(&declaration)
        .with_context(|| format!("Failed to assemble tree from {}", file.display()))?;

    println!("{}: {} nodes", file.display(), registry.len());
    print_layout(&registry, registry.root().slug(), 0);

    let handlers = builtins::registry();
    let missing = missing_handlers(&registry, &handlers);
    if !missing.is_empty() {
        println!();
        println!("Handlers not provided by treely (register them when embedding):");
        for (kind, key) in missing {
            println!("  {kind:<9} {key}");
        }
    }
    Ok(())
}

fn print_layout(registry: &TreeRegistry, slug: &str, depth: usize) {
    let Some(decl) = registry.declaration(slug) else {
        return;
    };
    let mut line = format!("{:indent$}{} [{}]", "", decl.slug, decl.kind, indent = depth * 2);
    if let Some(limit) = decl.limit {
        line.push_str(&format!(" limit={limit}"));
    }
    if let Some(weight) = decl.weight {
        line.push_str(&format!(" weight={weight}"));
    }
    if let Some(name) = &decl.name {
        line.push_str(&format!(" \"{name}\""));
    }
    println!("{line}");

    for child in &decl.children {
        print_layout(registry, child, depth + 1);
    }
}

fn missing_handlers(
    registry: &TreeRegistry,
    handlers: &bt_tree::HandlerRegistry,
) -> Vec<(bt_tree::HandlerKind, String)> {
    use bt_tree::HandlerKind;

    let mut missing = Vec::new();
    for entry in registry.iter() {
        let decl = entry.declaration();
        let wanted = [
            (HandlerKind::Action, &decl.action_handler),
            (HandlerKind::Condition, &decl.condition_handler),
            (HandlerKind::Selector, &decl.selector_handler),
        ];
        for (kind, key) in wanted {
            if let Some(key) = key {
                if !handlers.contains(kind, key) && !missing.contains(&(kind, key.clone())) {
                    missing.push((kind, key.clone()));
                }
            }
        }
    }
    missing
}

fn print_summary(tree: &BehaviorTree) {
    println!();
    println!(
        "passes: {}  stopped: {}",
        tree.root_evaluation_count(),
        tree.is_stopped()
    );
    println!("{:<24} {:<20} {:>6} {:>6}", "slug", "type", "runs", "pass");
    for entry in tree.registry().iter() {
        let node = entry.node();
        println!(
            "{:<24} {:<20} {:>6} {:>6}",
            entry.slug(),
            node.kind().name(),
            node.run_count(),
            node.run_path_count()
        );
    }
}

fn print_trace(tree: &BehaviorTree) {
    let Some(log) = tree.blackboard().fetch::<TraceLog>(TRACE_LOG) else {
        return;
    };
    println!();
    println!("trace ({} events):", log.len());
    for event in &log.events {
        println!(
            "  #{:<4} {:<18} {} ({})",
            event.pass,
            event.tag,
            event.slug.as_deref().unwrap_or("-"),
            event.a
        );
    }
}
