//! Lister CLI - Generate marketplace listings from product photos.
//!
//! Lister takes product photographs plus an optional seller description and
//! produces a structured listing draft: title, HTML description, category
//! path, and estimated postage weight.
//!
//! # Usage
//!
//! ```bash
//! # Generate a draft from photos
//! lister generate front.jpg back.jpg --description "Vintage leather jacket"
//!
//! # View configuration
//! lister config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lister - Generate marketplace listings from product photos.
#[derive(Parser, Debug)]
#[command(name = "lister")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a listing draft from product images
    Generate(cli::generate::GenerateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match lister_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lister config path`."
            );
            lister_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lister v{}", lister_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
