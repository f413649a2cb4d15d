//! CLI application for invoice normalization.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, mappings, normalize};

/// Invoice normalizer - map extraction payloads onto a canonical invoice schema
#[derive(Parser)]
#[command(name = "invnorm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a vendor mappings JSON file
    #[arg(short, long, global = true)]
    mappings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a single extraction payload
    Normalize(normalize::NormalizeArgs),

    /// Normalize multiple extraction payloads
    Batch(batch::BatchArgs),

    /// Inspect and validate vendor mappings
    Mappings(mappings::MappingsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Normalize(args) => normalize::run(args, cli.mappings.as_deref()),
        Commands::Batch(args) => batch::run(args, cli.mappings.as_deref()),
        Commands::Mappings(args) => mappings::run(args, cli.mappings.as_deref()),
    }
}
