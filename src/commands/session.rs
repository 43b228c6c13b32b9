//! Interactive session: the event-driven environment the controller is
//! built for. Stdin lines are user input events; a driver interval fires
//! the debounce and periodic-save ticks.

use clap::Args;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::controller::DocumentController;
use crate::history::ResolvedFrom;
use crate::models::{Category, ItemField, ALL_CATEGORIES};

use super::history_cmd::format_timestamp;
use super::item::print_category;
use super::open_controller;

/// How often the driver checks timers; well under the debounce window.
const DRIVER_TICK_MS: u64 = 250;

/// Edit the project interactively with live auto-save and history navigation
#[derive(Args)]
pub struct SessionCommand {
    /// Snapshot id to start from (the address-bar state parameter)
    #[arg(long)]
    state: Option<String>,

    /// Start offline: periodic auto-save suspended, editing unaffected
    #[arg(long)]
    offline: bool,
}

impl SessionCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut controller = open_controller(config, self.state.as_deref());
        controller.set_online(!self.offline);

        println!("ideaboard session — type 'help' for commands, 'quit' to leave");
        println!(
            "{} ideas in {} sections",
            controller.document().total_items(),
            controller.document().sections_with_content()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut driver = tokio::time::interval(Duration::from_millis(DRIVER_TICK_MS));

        loop {
            tokio::select! {
                _ = driver.tick() => {
                    controller.tick();
                }
                line = lines.next_line() => {
                    match line? {
                        None => break,
                        Some(line) => {
                            if !handle_line(&mut controller, line.trim()) {
                                break;
                            }
                        }
                    }
                }
            }
        }

        controller.shutdown();
        println!("Session saved");
        Ok(())
    }
}

/// Handles one input line; returns `false` to end the session.
fn handle_line(controller: &mut DocumentController, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    match command {
        "quit" | "exit" => return false,
        "help" => print_help(),
        "add" => match parse_category(rest.first()) {
            Ok(category) => {
                let item = controller.add_item(category);
                println!("Added '{}' (id {})", item.title, item.id);
            }
            Err(e) => println!("{}", e),
        },
        "list" => match rest.first() {
            Some(raw) => match Category::from_str(raw) {
                Ok(category) => print_category(controller.document(), category),
                Err(e) => println!("{}", e),
            },
            None => {
                for category in ALL_CATEGORIES {
                    print_category(controller.document(), category);
                }
            }
        },
        "set" => match parse_update(&rest) {
            Ok((category, id, field, value)) => {
                match controller.update_item(category, id, field, &value) {
                    Ok(true) => println!("Updated {} of item {}", field, id),
                    Ok(false) => println!("No change"),
                    Err(e) => println!("{}", e),
                }
            }
            Err(e) => println!("{}", e),
        },
        "del" => match parse_item_ref(&rest) {
            Ok((category, id)) => match controller.delete_item(category, id) {
                Ok(title) => println!("Deleted '{}'", title),
                Err(e) => println!("{}", e),
            },
            Err(e) => println!("{}", e),
        },
        "back" => match controller.navigate_back() {
            Some(resolution) => print_resolution("Went back", &resolution.resolved_from),
            None => println!("Nothing earlier in history"),
        },
        "forward" => match controller.navigate_forward() {
            Some(resolution) => print_resolution("Went forward", &resolution.resolved_from),
            None => println!("Nothing later in history"),
        },
        "save" => {
            let description = if rest.is_empty() {
                "Manual save".to_string()
            } else {
                rest.join(" ")
            };
            match controller.flush_save(&description) {
                Some(id) => println!("Saved snapshot {}", id),
                None => println!("Save failed, will retry"),
            }
        }
        "online" => controller.set_online(true),
        "offline" => controller.set_online(false),
        "stats" => {
            let stats = controller.store().stats();
            println!(
                "{} ideas • {} snapshots{}",
                controller.document().total_items(),
                stats.total_entries,
                stats
                    .newest_timestamp
                    .map(|ts| format!(" • last saved {}", format_timestamp(ts)))
                    .unwrap_or_default()
            );
        }
        other => println!("Unknown command '{}' — type 'help'", other),
    }
    true
}

fn parse_category(raw: Option<&&str>) -> Result<Category, String> {
    match raw {
        Some(raw) => Category::from_str(raw),
        None => Err("Missing category".to_string()),
    }
}

fn parse_item_ref(rest: &[&str]) -> Result<(Category, i64), String> {
    let [category, id] = rest else {
        return Err("Usage: del <category> <id>".to_string());
    };
    let category = Category::from_str(category)?;
    let id: i64 = id.parse().map_err(|_| format!("Invalid id '{}'", id))?;
    Ok((category, id))
}

fn parse_update(rest: &[&str]) -> Result<(Category, i64, ItemField, String), String> {
    if rest.len() < 4 {
        return Err("Usage: set <category> <id> <title|content|date> <value>".to_string());
    }
    let category = Category::from_str(rest[0])?;
    let id: i64 = rest[1]
        .parse()
        .map_err(|_| format!("Invalid id '{}'", rest[1]))?;
    let field = <ItemField as clap::ValueEnum>::from_str(rest[2], true)?;
    Ok((category, id, field, rest[3..].join(" ")))
}

fn print_resolution(action: &str, from: &ResolvedFrom) {
    match from {
        ResolvedFrom::Address => println!("{} (snapshot replayed)", action),
        ResolvedFrom::NewestEntry => println!("{} (fell back to latest save)", action),
        ResolvedFrom::Empty => println!("{} (empty project)", action),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  add <category>                      new idea card");
    println!("  list [category]                     show cards");
    println!("  set <category> <id> <field> <text>  edit title, content, or date");
    println!("  del <category> <id>                 delete a card (saves immediately)");
    println!("  back / forward                      navigate snapshot history");
    println!("  save [description]                  save right now");
    println!("  online / offline                    toggle connectivity");
    println!("  stats                               project summary");
    println!("  quit                                save and leave");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SystemClock;
    use crate::history::{HistoryBridge, MemoryHistory};
    use crate::store::{MemorySessionStore, SnapshotStore};
    use std::sync::Arc;

    fn test_controller() -> DocumentController {
        let store = SnapshotStore::open(Box::new(MemorySessionStore::new()), 0);
        let bridge = HistoryBridge::new(
            Box::new(MemoryHistory::with_initial_url("app://ideaboard")),
            "app://ideaboard",
        );
        DocumentController::new(store, bridge, Arc::new(SystemClock), "Test", None)
    }

    #[test]
    fn test_handle_line_add_and_del() {
        let mut controller = test_controller();
        assert!(handle_line(&mut controller, "add narrativa"));
        assert_eq!(controller.document().items(Category::Narrative).len(), 1);

        let id = controller.document().items(Category::Narrative)[0].id;
        assert!(handle_line(&mut controller, &format!("del narrativa {}", id)));
        assert!(controller.document().items(Category::Narrative).is_empty());
    }

    #[test]
    fn test_handle_line_quit() {
        let mut controller = test_controller();
        assert!(!handle_line(&mut controller, "quit"));
        assert!(handle_line(&mut controller, "unknown gibberish"));
    }

    #[test]
    fn test_parse_update() {
        let (category, id, field, value) =
            parse_update(&["cronograma", "17", "date", "2026-10-01"]).unwrap();
        assert_eq!(category, Category::Schedule);
        assert_eq!(id, 17);
        assert_eq!(field, ItemField::Date);
        assert_eq!(value, "2026-10-01");

        assert!(parse_update(&["cronograma", "17"]).is_err());
        assert!(parse_update(&["cronograma", "x", "date", "v"]).is_err());
    }

    #[test]
    fn test_parse_update_joins_value_words() {
        let (_, _, _, value) =
            parse_update(&["narrativa", "1", "content", "a", "longer", "idea"]).unwrap();
        assert_eq!(value, "a longer idea");
    }
}
