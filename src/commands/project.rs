use chrono::Utc;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Config;

use super::open_controller;

/// Export the project (and history backup) to a JSON file
#[derive(Args)]
pub struct ExportCommand {
    /// Output path (defaults to game-project-<date>.json)
    path: Option<PathBuf>,
}

impl ExportCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let controller = open_controller(config, None);
        let envelope = controller.export();

        let path = self.path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("game-project-{}.json", Utc::now().format("%Y-%m-%d")))
        });
        let json = serde_json::to_string_pretty(&envelope)?;
        std::fs::write(&path, json)?;

        println!(
            "Exported {} ideas and {} snapshots to {}",
            envelope.metadata.total_items,
            envelope.metadata.history_entries,
            path.display()
        );
        Ok(())
    }
}

/// Import a project file, replacing the current document
#[derive(Args)]
pub struct ImportCommand {
    /// Project file (full export envelope or bare document)
    path: PathBuf,

    /// Do not restore the history backup even if the file carries one
    #[arg(long)]
    skip_history: bool,

    /// Skip confirmation prompt
    #[arg(long, short)]
    force: bool,
}

impl ImportCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut raw = std::fs::read_to_string(&self.path)?;
        if self.skip_history {
            // Strip the backup before it reaches the controller.
            let mut value: serde_json::Value = serde_json::from_str(&raw)?;
            if let Some(obj) = value.as_object_mut() {
                obj.remove("historyBackup");
            }
            raw = value.to_string();
        }

        let mut controller = open_controller(config, None);

        if !self.force {
            let current = controller.document().total_items();
            print!(
                "Importing will replace the current document ({} ideas). Continue? [y/N] ",
                current
            );
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Cancelled");
                return Ok(());
            }
        }

        let summary = controller.import(&raw)?;
        println!(
            "Imported {} ideas{}",
            summary.total_items,
            if summary.history_restored {
                " (history restored)"
            } else {
                ""
            }
        );
        Ok(())
    }
}

/// Erase the whole project and its history
#[derive(Args)]
pub struct ResetCommand {
    /// Skip both confirmation prompts
    #[arg(long, short)]
    force: bool,
}

impl ResetCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut controller = open_controller(config, None);
        let overview = controller.request_reset();

        if !self.force {
            println!("This will erase:");
            println!(
                "  {} ideas across {} sections",
                overview.total_items, overview.sections_with_content
            );
            println!("  {} history snapshots", overview.history_entries);
            println!();

            print!("Continue? [y/N] ");
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Cancelled");
                return Ok(());
            }

            print!("Really erase everything? This cannot be undone. [y/N] ");
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Cancelled");
                return Ok(());
            }
        }

        let confirmation = controller.confirm_reset(overview);
        controller.execute_reset(confirmation);
        println!("Project reset");
        Ok(())
    }
}
