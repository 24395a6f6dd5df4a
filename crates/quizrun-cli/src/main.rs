//! quizrun CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod terminal;

#[derive(Parser)]
#[command(name = "quizrun", version, about = "Self-quiz runner for JSON question banks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive quiz
    Play {
        /// Directory holding .json question banks
        #[arg(long)]
        database: Option<PathBuf>,

        /// Play a single bank file, skipping source selection
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Seed for shuffling, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List question banks with their question counts
    List {
        /// Directory holding .json question banks
        #[arg(long)]
        database: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank file or directory
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create starter config and sample question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizrun=warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            database,
            bank,
            seed,
            config,
        } => commands::play::execute(database, bank, seed, config),
        Commands::List { database, config } => commands::list::execute(database, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
