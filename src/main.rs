//! Modgraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "modgraph")]
#[command(about = "Live module dependency graph for development servers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph from the entry module and exit
    Scan {
        /// Entry module (defaults to `entry` in modgraph.toml)
        entry: Option<PathBuf>,
    },
    /// Show which modules must be rebuilt when one changes
    Plan {
        /// Module that changed
        changed: PathBuf,

        /// Entry module (defaults to `entry` in modgraph.toml)
        #[arg(short, long)]
        entry: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the graph, then keep it in sync with edits on disk
    Watch {
        /// Entry module (defaults to `entry` in modgraph.toml)
        entry: Option<PathBuf>,

        /// Directories to watch (defaults to `roots` in modgraph.toml)
        roots: Vec<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "modgraph={0},modgraph_core={0},modgraph_indexer={0},modgraph_watcher={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Modgraph v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Project root: {}", cli.root.display());

    match cli.command {
        Commands::Scan { entry } => commands::scan(cli.root, entry).await,
        Commands::Plan { changed, entry, json } => {
            commands::plan(cli.root, entry, changed, json).await
        }
        Commands::Watch { entry, roots } => commands::watch(cli.root, entry, roots).await,
        Commands::Version => {
            println!("Modgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
