//! ragchat CLI — the main entry point.
//!
//! Commands:
//! - `chat`    — Interactive chat or single-message mode
//! - `config`  — Print the default config (or its path)
//! - `doctor`  — Diagnose config and provider health

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ragchat",
    about = "ragchat — chat with an LLM, grounded in your own notes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Extra documents to load into the context store
        #[arg(short, long = "context", value_name = "FILE")]
        context: Vec<PathBuf>,
    },

    /// Print the default configuration
    Config {
        /// Print only the config file path
        #[arg(long)]
        path: bool,
    },

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat { message, context } => commands::chat::run(message, context).await?,
        Commands::Config { path } => commands::config_cmd::run(path)?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
