use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod controller;
mod history;
mod models;
mod store;

use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ExportCommand, HistoryCommand, ImportCommand,
    ListCommand, ResetCommand, SessionCommand, UpdateCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "ideaboard")]
#[command(version)]
#[command(about = "Organize game design ideas with snapshot history", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new idea card
    Add(AddCommand),

    /// List idea cards
    List(ListCommand),

    /// Edit an existing card
    Update(UpdateCommand),

    /// Delete a card
    Delete(DeleteCommand),

    /// Inspect or clear the snapshot history
    History(HistoryCommand),

    /// Export the project to a JSON file
    Export(ExportCommand),

    /// Import a project file
    Import(ImportCommand),

    /// Erase the project and its history
    Reset(ResetCommand),

    /// Edit interactively with live auto-save
    Session(SessionCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideaboard=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Add(cmd)) => cmd.run(&config)?,
        Some(Commands::List(cmd)) => cmd.run(&config)?,
        Some(Commands::Update(cmd)) => cmd.run(&config)?,
        Some(Commands::Delete(cmd)) => cmd.run(&config)?,
        Some(Commands::History(cmd)) => cmd.run(&config)?,
        Some(Commands::Export(cmd)) => cmd.run(&config)?,
        Some(Commands::Import(cmd)) => cmd.run(&config)?,
        Some(Commands::Reset(cmd)) => cmd.run(&config)?,
        Some(Commands::Session(cmd)) => cmd.run(&config).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
