use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five fixed sections of a project document.
///
/// Wire names match the established project file format, so exported
/// projects stay importable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(rename = "narrativa")]
    Narrative,
    #[serde(rename = "personagens")]
    Characters,
    #[serde(rename = "mecanicas")]
    Mechanics,
    #[serde(rename = "tecnologias")]
    Technology,
    #[serde(rename = "cronograma")]
    Schedule,
}

/// All categories in display order.
pub const ALL_CATEGORIES: [Category; 5] = [
    Category::Narrative,
    Category::Characters,
    Category::Mechanics,
    Category::Technology,
    Category::Schedule,
];

impl Category {
    /// Wire name used as the JSON key in documents and exports.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Narrative => "narrativa",
            Category::Characters => "personagens",
            Category::Mechanics => "mecanicas",
            Category::Technology => "tecnologias",
            Category::Schedule => "cronograma",
        }
    }

    /// Title given to a freshly created item in this category.
    pub fn default_title(&self) -> &'static str {
        match self {
            Category::Narrative => "Nova Ideia de História",
            Category::Characters => "Novo Personagem",
            Category::Mechanics => "Nova Mecânica",
            Category::Technology => "Nova Tecnologia",
            Category::Schedule => "Nova Tarefa",
        }
    }

    /// Phrase used when asking the user to confirm a deletion.
    pub fn delete_label(&self) -> &'static str {
        match self {
            Category::Narrative => "this story idea",
            Category::Characters => "this character",
            Category::Mechanics => "this mechanic",
            Category::Technology => "this technology",
            Category::Schedule => "this schedule task",
        }
    }

    /// Only schedule items carry a due date.
    pub fn has_date(&self) -> bool {
        matches!(self, Category::Schedule)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "narrativa" | "narrative" => Ok(Category::Narrative),
            "personagens" | "characters" => Ok(Category::Characters),
            "mecanicas" | "mechanics" => Ok(Category::Mechanics),
            "tecnologias" | "technology" => Ok(Category::Technology),
            "cronograma" | "schedule" => Ok(Category::Schedule),
            _ => Err(format!(
                "Invalid category '{}'. Valid options: narrativa, personagens, mecanicas, tecnologias, cronograma",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", Category::Narrative), "narrativa");
        assert_eq!(format!("{}", Category::Characters), "personagens");
        assert_eq!(format!("{}", Category::Schedule), "cronograma");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(Category::from_str("narrativa").unwrap(), Category::Narrative);
        assert_eq!(Category::from_str("NARRATIVA").unwrap(), Category::Narrative);
        assert_eq!(Category::from_str("mechanics").unwrap(), Category::Mechanics);
        assert_eq!(Category::from_str("schedule").unwrap(), Category::Schedule);
    }

    #[test]
    fn test_category_from_str_invalid() {
        assert!(Category::from_str("story").is_err());
        assert!(Category::from_str("").is_err());
    }

    #[test]
    fn test_category_json_uses_wire_name() {
        let json = serde_json::to_string(&Category::Technology).unwrap();
        assert_eq!(json, "\"tecnologias\"");

        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::Technology);
    }

    #[test]
    fn test_only_schedule_has_date() {
        for category in ALL_CATEGORIES {
            assert_eq!(category.has_date(), category == Category::Schedule);
        }
    }
}
