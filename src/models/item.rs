use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;

/// A single idea card.
///
/// Ids are derived from the creation time in milliseconds and are unique
/// within a document. Items are mutated in place by field updates and are
/// never re-keyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Due date, only meaningful for schedule items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub created_at: String,
}

impl Item {
    /// Creates a fresh item for `category` with the category's default title.
    pub fn new(category: Category, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: category.default_title().to_string(),
            content: String::new(),
            date: if category.has_date() {
                Some(String::new())
            } else {
                None
            },
            created_at: created_at.to_rfc3339(),
        }
    }
}

/// An editable field of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ItemField {
    Title,
    Content,
    Date,
}

impl ItemField {
    /// Applies `value` to the field, returning `true` if the stored value
    /// actually changed.
    pub fn apply(&self, item: &mut Item, value: &str) -> bool {
        match self {
            ItemField::Title => {
                if item.title == value {
                    return false;
                }
                item.title = value.to_string();
            }
            ItemField::Content => {
                if item.content == value {
                    return false;
                }
                item.content = value.to_string();
            }
            ItemField::Date => {
                if item.date.as_deref() == Some(value) {
                    return false;
                }
                item.date = Some(value.to_string());
            }
        }
        true
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemField::Title => write!(f, "title"),
            ItemField::Content => write!(f, "content"),
            ItemField::Date => write!(f, "date"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_uses_default_title() {
        let item = Item::new(Category::Characters, 1700000000000, Utc::now());
        assert_eq!(item.title, "Novo Personagem");
        assert_eq!(item.content, "");
        assert!(item.date.is_none());
    }

    #[test]
    fn test_new_schedule_item_has_empty_date() {
        let item = Item::new(Category::Schedule, 1700000000000, Utc::now());
        assert_eq!(item.date.as_deref(), Some(""));
    }

    #[test]
    fn test_apply_reports_change() {
        let mut item = Item::new(Category::Narrative, 1, Utc::now());
        assert!(ItemField::Title.apply(&mut item, "Opening scene"));
        assert_eq!(item.title, "Opening scene");
        assert!(!ItemField::Title.apply(&mut item, "Opening scene"));
    }

    #[test]
    fn test_apply_date_to_non_schedule_item() {
        let mut item = Item::new(Category::Mechanics, 1, Utc::now());
        assert!(ItemField::Date.apply(&mut item, "2026-01-01"));
        assert_eq!(item.date.as_deref(), Some("2026-01-01"));
        assert!(!ItemField::Date.apply(&mut item, "2026-01-01"));
    }

    #[test]
    fn test_item_json_is_camel_case() {
        let item = Item::new(Category::Narrative, 42, Utc::now());
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"createdAt\""));
        // Absent dates are omitted entirely from the serialized item.
        assert!(!json.contains("\"date\""));
    }
}
