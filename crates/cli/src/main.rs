//! notion-recall CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive chat over selected workspace content
//! - `pages`: List the pages the integration can read
//! - `export`: Write flattened pages to text files
//! - `databases`: Print every database as flattened text

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod prompt;

#[derive(Parser)]
#[command(
    name = "recall",
    about = "notion-recall: chat with your Notion workspace",
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
    /// Chat about your workspace content
    Chat {
        /// Completion model (llama3-8b-8192, llama3-70b-8192, mixtral-8x7b-32768)
        #[arg(short, long)]
        model: Option<String>,

        /// Your name, instead of being asked for it
        #[arg(short, long)]
        name: Option<String>,

        /// Keep memories in this process only instead of the cloud store
        #[arg(long)]
        offline_memory: bool,

        /// Skip loading workspace content at startup
        #[arg(long)]
        no_content: bool,
    },

    /// List accessible pages
    Pages,

    /// Export pages as text files
    Export {
        /// Pages to export: `all`, numbers, or ranges such as `1,3-5`
        selection: String,

        /// Write to this file instead of the default name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print all accessible databases
    Databases,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat {
            model,
            name,
            offline_memory,
            no_content,
        } => {
            commands::chat::run(commands::chat::ChatOptions {
                model,
                name,
                offline_memory,
                load_content: !no_content,
            })
            .await?
        }
        Commands::Pages => commands::pages::run().await?,
        Commands::Export { selection, output } => commands::export::run(&selection, output).await?,
        Commands::Databases => commands::databases::run().await?,
    }

    Ok(())
}
