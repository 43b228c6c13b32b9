use chrono::DateTime;
use clap::{Args, Subcommand};
use std::io::{self, Write};

use crate::config::Config;
use crate::controller::{Clock, SystemClock};
use crate::store::{FileSessionStore, SnapshotStore, MAX_ENTRIES};

/// Inspect or clear the snapshot history
#[derive(Args)]
pub struct HistoryCommand {
    #[command(subcommand)]
    command: Option<HistorySubcommand>,
}

#[derive(Subcommand)]
enum HistorySubcommand {
    /// List recorded snapshots (default)
    List,

    /// Show one snapshot in full
    Show {
        /// Snapshot id
        id: String,
    },

    /// Summary statistics for the log
    Stats,

    /// Remove the whole history log
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl HistoryCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = FileSessionStore::new(&config.data_dir);
        let mut store = SnapshotStore::open(Box::new(session), SystemClock.now_ms());

        match &self.command {
            None | Some(HistorySubcommand::List) => self.list(&store),
            Some(HistorySubcommand::Show { id }) => self.show(&store, id),
            Some(HistorySubcommand::Stats) => self.stats(&store),
            Some(HistorySubcommand::Clear { force }) => self.clear(&mut store, *force),
        }
    }

    fn list(&self, store: &SnapshotStore) -> Result<(), Box<dyn std::error::Error>> {
        let log = store.log();
        if log.entries.is_empty() {
            println!("No snapshots recorded yet");
            return Ok(());
        }

        for snapshot in &log.entries {
            let current = if log.current_state_id.as_deref() == Some(snapshot.id.as_str()) {
                " *"
            } else {
                ""
            };
            println!(
                "{}  {}  {}{}",
                snapshot.id,
                format_timestamp(snapshot.timestamp),
                snapshot.description,
                current
            );
        }
        println!();
        println!("{} of {} entries", log.entries.len(), MAX_ENTRIES);
        Ok(())
    }

    fn show(&self, store: &SnapshotStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = store
            .find_by_id(id)
            .ok_or_else(|| format!("No snapshot with id {}", id))?;

        println!("Snapshot {}", snapshot.id);
        println!("Recorded: {}", format_timestamp(snapshot.timestamp));
        println!("Cause:    {}", snapshot.description);
        if !snapshot.location_url.is_empty() {
            println!("Address:  {}", snapshot.location_url);
        }
        println!();
        println!("{}", serde_json::to_string_pretty(&snapshot.data)?);
        Ok(())
    }

    fn stats(&self, store: &SnapshotStore) -> Result<(), Box<dyn std::error::Error>> {
        let stats = store.stats();
        println!("Snapshot history");
        println!("================");
        println!();
        println!("Entries: {} (max {})", stats.total_entries, MAX_ENTRIES);
        if let Some(oldest) = stats.oldest_timestamp {
            println!("Oldest:  {}", format_timestamp(oldest));
        }
        if let Some(newest) = stats.newest_timestamp {
            println!("Newest:  {}", format_timestamp(newest));
        }
        match stats.current_state_id {
            Some(id) => println!("Current: {}", id),
            None => println!("Current: (none)"),
        }
        Ok(())
    }

    fn clear(
        &self,
        store: &mut SnapshotStore,
        force: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let count = store.log().entries.len();
        if count == 0 {
            println!("History is already empty");
            return Ok(());
        }

        if !force {
            print!("Discard all {} snapshots? [y/N] ", count);
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Cancelled");
                return Ok(());
            }
        }

        store.clear(SystemClock.now_ms());
        println!("History cleared ({} snapshots discarded)", count);
        Ok(())
    }
}

pub(crate) fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("@{}ms", ms))
}
