//! Tern Bridge CLI - editor commands for JavaScript analysis sessions.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "tern-bridge")]
#[command(about = "Run JavaScript analysis queries against per-project engine sessions", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ./tern-bridge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show completions at a position
    Hints(QueryArgs),
    /// Jump to the definition of the symbol at a position
    Definition(QueryArgs),
    /// Find references to the symbol at a position
    Refs(QueryArgs),
    /// Show the project a file belongs to
    Project {
        /// File inside the project
        file: PathBuf,
    },
}

/// Arguments shared by every query command.
#[derive(Args)]
pub struct QueryArgs {
    /// File the query runs in
    file: PathBuf,
    /// Character offset of the cursor
    #[arg(short, long, default_value = "0")]
    offset: usize,
    /// End of a selection starting at --offset
    #[arg(long)]
    selection_end: Option<usize>,
    /// Read unsaved buffer contents from stdin
    #[arg(long)]
    stdin: bool,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Hints(args) => commands::query::hints(&config, &args),
        Commands::Definition(args) => commands::query::definition(&config, &args),
        Commands::Refs(args) => commands::query::refs(&config, &args),
        Commands::Project { file } => commands::project::show(&config, &file),
    }
}
