//! CLI application for receipt OCR processing.

mod commands;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, config, process, query, show};

/// Receipt OCR - Extract, store, and report expense receipts
#[derive(Parser)]
#[command(name = "rcpt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (overrides LOG_LEVEL)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single upload event
    Process(process::ProcessArgs),

    /// Process multiple event files
    Batch(batch::BatchArgs),

    /// Show a stored receipt
    Show(show::ShowArgs),

    /// List stored receipts within a date range
    Query(query::QueryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = commands::load_config(cli.config.as_deref());

    // Set up logging based on verbosity, falling back to the configured level
    let configured = match &loaded {
        Ok(config) => config.logging.level_filter().ok_or(config.logging.level.as_str()),
        Err(_) => Ok(LevelFilter::INFO),
    };
    let level = match cli.verbose {
        0 => configured.unwrap_or(LevelFilter::INFO),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(level.to_string()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(unknown) = configured {
        warn!("Unknown log level '{}', using info", unknown);
    }

    // Execute command
    match cli.command {
        Commands::Process(args) => process::run(args, &loaded?).await,
        Commands::Batch(args) => batch::run(args, &loaded?).await,
        Commands::Show(args) => show::run(args, &loaded?).await,
        Commands::Query(args) => query::run(args, &loaded?).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
