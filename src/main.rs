//! Genetics CLI - breed and inspect populations of arena players.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Genetics - evolve network-driven players in a grid arena
#[derive(Parser, Debug)]
#[command(name = "genetics")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (default: CPU count)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a population of arena players
    Evolve(cli::evolve::EvolveArgs),

    /// Print the lineage of a saved population
    Inspect {
        /// Population file written by `evolve --save`
        #[arg(required = true)]
        population: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let pool = args
        .threads
        .map(|threads| rayon::ThreadPoolBuilder::new().num_threads(threads).build_global());
    if let Some(Err(e)) = pool {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let result = match args.command {
        Commands::Evolve(evolve) => cli::evolve::execute(&evolve),
        Commands::Inspect { population, format } => cli::inspect::execute(&population, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
