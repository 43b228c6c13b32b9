use clap::{Args, ValueEnum};
use std::io::{self, Write};

use crate::config::Config;
use crate::controller::DocumentController;
use crate::models::{Category, Document, Item, ItemField, ALL_CATEGORIES};

use super::open_controller;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Add a new idea card
#[derive(Args)]
pub struct AddCommand {
    /// Category to add to
    category: Category,

    /// Title (defaults to the category's standard title)
    #[arg(long)]
    title: Option<String>,

    /// Body text
    #[arg(long)]
    content: Option<String>,

    /// Due date (schedule items)
    #[arg(long)]
    date: Option<String>,
}

impl AddCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut controller = open_controller(config, None);
        let item = controller.add_item(self.category);
        let id = item.id;

        if let Some(title) = &self.title {
            controller.update_item(self.category, id, ItemField::Title, title)?;
        }
        if let Some(content) = &self.content {
            controller.update_item(self.category, id, ItemField::Content, content)?;
        }
        if let Some(date) = &self.date {
            controller.update_item(self.category, id, ItemField::Date, date)?;
        }
        controller.shutdown();

        let item = controller
            .document()
            .find_item(self.category, id)
            .ok_or_else(|| format!("Item {} vanished after creation", id))?;
        println!("Added '{}' to {} (id {})", item.title, self.category, id);
        Ok(())
    }
}

/// List idea cards
#[derive(Args)]
pub struct ListCommand {
    /// Restrict to one category
    category: Option<Category>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ListCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let controller = open_controller(config, None);
        let document = controller.document();

        match self.format {
            OutputFormat::Json => match self.category {
                Some(category) => {
                    println!("{}", serde_json::to_string_pretty(document.items(category))?)
                }
                None => println!("{}", serde_json::to_string_pretty(document)?),
            },
            OutputFormat::Text => {
                match self.category {
                    Some(category) => print_category(document, category),
                    None => {
                        for category in ALL_CATEGORIES {
                            print_category(document, category);
                        }
                    }
                }
                println!(
                    "{} ideas in {} sections",
                    document.total_items(),
                    document.sections_with_content()
                );
            }
        }
        Ok(())
    }
}

/// Edit fields of an existing card
#[derive(Args)]
pub struct UpdateCommand {
    /// Category the card lives in
    category: Category,

    /// Card id
    id: i64,

    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New body text
    #[arg(long)]
    content: Option<String>,

    /// New due date (schedule items)
    #[arg(long)]
    date: Option<String>,
}

impl UpdateCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        if self.title.is_none() && self.content.is_none() && self.date.is_none() {
            return Err("Nothing to update: pass --title, --content, or --date".into());
        }

        let mut controller = open_controller(config, None);
        let mut changed = false;
        if let Some(title) = &self.title {
            changed |= controller.update_item(self.category, self.id, ItemField::Title, title)?;
        }
        if let Some(content) = &self.content {
            changed |=
                controller.update_item(self.category, self.id, ItemField::Content, content)?;
        }
        if let Some(date) = &self.date {
            changed |= controller.update_item(self.category, self.id, ItemField::Date, date)?;
        }
        controller.shutdown();

        if changed {
            println!("Updated item {} in {}", self.id, self.category);
        } else {
            println!("No changes (values already match)");
        }
        Ok(())
    }
}

/// Delete a card
#[derive(Args)]
pub struct DeleteCommand {
    /// Category the card lives in
    category: Category,

    /// Card id
    id: i64,

    /// Skip confirmation prompt
    #[arg(long, short)]
    force: bool,
}

impl DeleteCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let mut controller = open_controller(config, None);

        let item = controller
            .document()
            .find_item(self.category, self.id)
            .ok_or_else(|| format!("No item with id {} in {}", self.id, self.category))?;

        if !self.force {
            print!(
                "Delete {} '{}'? This cannot be undone. [y/N] ",
                self.category.delete_label(),
                item.title
            );
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().read_line(&mut answer)?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Cancelled");
                return Ok(());
            }
        }

        let title = controller.delete_item(self.category, self.id)?;
        println!("Deleted '{}'", title);
        Ok(())
    }
}

pub(crate) fn print_category(document: &Document, category: Category) {
    let items = document.items(category);
    println!("{} ({})", category, items.len());
    println!("{}", "-".repeat(category.key().len() + 4));
    for item in items {
        print_item(item);
    }
    println!();
}

pub(crate) fn print_item(item: &Item) {
    match &item.date {
        Some(date) if !date.is_empty() => println!("  [{}] {} (due {})", item.id, item.title, date),
        _ => println!("  [{}] {}", item.id, item.title),
    }
    if !item.content.is_empty() {
        for line in item.content.lines() {
            println!("      {}", line);
        }
    }
}
