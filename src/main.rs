//! scout CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use scout::{
    commands::{
        cmd_index, cmd_init, cmd_search, cmd_status, print_index_stats, print_search_results,
        print_status, SearchOptions,
    },
    config::Config,
    error::Result,
    progress::LogWriterFactory,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "scout")]
#[command(version, about = "Rank local files against a query with an LLM re-ranker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Index a directory of text files, replacing the previous index
    Index {
        /// Directory to index
        path: PathBuf,
    },

    /// Rank indexed files against a query
    Search {
        /// The search query
        query: String,

        /// Candidate selection: 'full' or 'hybrid'
        #[arg(short, long)]
        mode: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show configuration and index status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => {
            let base_dir = init_base_dir(cli.config.as_deref());
            let config = cmd_init(base_dir, force)?;
            if cli.json {
                print_json(&config.paths.config_file)?;
            } else {
                println!("✓ scout initialized successfully");
                println!("  Config: {}", config.paths.config_file.display());
                println!("\nNext steps:");
                println!("  1. Point ranker.endpoint_url at your completion server");
                println!("  2. Index files: scout index /path/to/notes");
                println!("  3. Search: scout search \"quarterly tax documents\"");
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "scout", &mut std::io::stdout());
        }

        Commands::Index { path } => {
            let config = load_config(cli.config.as_deref())?;
            let stats = cmd_index(&config, &path)?;
            if cli.json {
                print_json(&stats)?;
            } else {
                print_index_stats(&stats);
            }
        }

        Commands::Search { query, mode, limit } => {
            let config = load_config(cli.config.as_deref())?;
            let report = cmd_search(&config, &query, SearchOptions { mode, limit }).await?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_search_results(&report);
            }
        }

        Commands::Status => {
            let config = load_config(cli.config.as_deref())?;
            let status = cmd_status(&config)?;
            if cli.json {
                print_json(&status)?;
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

/// A `.toml` path names the config file itself; anything else is its directory
fn config_file_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) if p.extension().is_some_and(|e| e == "toml") => p.to_path_buf(),
        Some(p) => p.join("config.toml"),
        None => Config::default_config_path(),
    }
}

fn init_base_dir(path: Option<&Path>) -> PathBuf {
    config_file_path(path)
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_base_dir)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = config_file_path(path);
    if config_path.exists() {
        Config::load(&config_path)
    } else {
        let base_dir = config_path.parent().map(PathBuf::from);
        Config::load_from(base_dir)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
