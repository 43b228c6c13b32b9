use serde::{Deserialize, Serialize};

use super::category::{Category, ALL_CATEGORIES};
use super::item::Item;

/// The live project document: one ordered list of items per category.
///
/// Every category field is always present, so the five-key shape holds by
/// construction and serializes to exactly the five-key map the project
/// file format uses. Order within a category is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub narrativa: Vec<Item>,
    #[serde(default)]
    pub personagens: Vec<Item>,
    #[serde(default)]
    pub mecanicas: Vec<Item>,
    #[serde(default)]
    pub tecnologias: Vec<Item>,
    #[serde(default)]
    pub cronograma: Vec<Item>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self, category: Category) -> &Vec<Item> {
        match category {
            Category::Narrative => &self.narrativa,
            Category::Characters => &self.personagens,
            Category::Mechanics => &self.mecanicas,
            Category::Technology => &self.tecnologias,
            Category::Schedule => &self.cronograma,
        }
    }

    pub fn items_mut(&mut self, category: Category) -> &mut Vec<Item> {
        match category {
            Category::Narrative => &mut self.narrativa,
            Category::Characters => &mut self.personagens,
            Category::Mechanics => &mut self.mecanicas,
            Category::Technology => &mut self.tecnologias,
            Category::Schedule => &mut self.cronograma,
        }
    }

    pub fn find_item(&self, category: Category, id: i64) -> Option<&Item> {
        self.items(category).iter().find(|item| item.id == id)
    }

    pub fn find_item_mut(&mut self, category: Category, id: i64) -> Option<&mut Item> {
        self.items_mut(category).iter_mut().find(|item| item.id == id)
    }

    pub fn total_items(&self) -> usize {
        ALL_CATEGORIES
            .iter()
            .map(|&category| self.items(category).len())
            .sum()
    }

    pub fn sections_with_content(&self) -> usize {
        ALL_CATEGORIES
            .iter()
            .filter(|&&category| !self.items(category).is_empty())
            .count()
    }

    /// Next creation-timestamp id, bumped past any existing id so that two
    /// items created in the same millisecond never collide.
    pub fn next_item_id(&self, now_ms: i64) -> i64 {
        let max_existing = ALL_CATEGORIES
            .iter()
            .flat_map(|&category| self.items(category).iter())
            .map(|item| item.id)
            .max()
            .unwrap_or(0);
        now_ms.max(max_existing + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_empty_document_serializes_all_five_keys() {
        let doc = Document::new();
        let json = serde_json::to_value(&doc).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 5);
        for category in ALL_CATEGORIES {
            assert!(map[category.key()].is_array());
        }
    }

    #[test]
    fn test_missing_categories_default_to_empty() {
        let doc: Document = serde_json::from_str(r#"{"narrativa": []}"#).unwrap();
        assert!(doc.personagens.is_empty());
        assert!(doc.cronograma.is_empty());
    }

    #[test]
    fn test_next_item_id_bumps_past_collisions() {
        let mut doc = Document::new();
        let now = Utc::now();
        doc.items_mut(Category::Narrative)
            .push(Item::new(Category::Narrative, 1000, now));
        assert_eq!(doc.next_item_id(1000), 1001);
        assert_eq!(doc.next_item_id(5000), 5000);
    }

    #[test]
    fn test_stats_helpers() {
        let mut doc = Document::new();
        let now = Utc::now();
        doc.items_mut(Category::Mechanics)
            .push(Item::new(Category::Mechanics, 1, now));
        doc.items_mut(Category::Mechanics)
            .push(Item::new(Category::Mechanics, 2, now));
        doc.items_mut(Category::Schedule)
            .push(Item::new(Category::Schedule, 3, now));

        assert_eq!(doc.total_items(), 3);
        assert_eq!(doc.sections_with_content(), 2);
    }
}
