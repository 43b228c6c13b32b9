//! Export envelope and import validation.
//!
//! Import accepts either the full envelope or a bare document, and must
//! verify the five-category structure before any state is touched.

use serde::{Deserialize, Serialize};

use crate::models::{Document, HistoryLog, ALL_CATEGORIES};

/// The exchange file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub project_data: Document,
    pub metadata: ExportMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_backup: Option<HistoryLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: String,
    pub project_name: String,
    pub version: String,
    pub total_items: usize,
    pub history_entries: usize,
    pub last_update: String,
}

/// Why an import was rejected. Blocking: nothing is applied on failure.
#[derive(Debug)]
pub enum ImportError {
    ParseError(serde_json::Error),
    /// Required category keys absent from the payload.
    MissingCategories(Vec<&'static str>),
    /// A category key is present but does not map to a sequence.
    MalformedCategory(&'static str),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::ParseError(e) => write!(f, "File is not valid JSON: {}", e),
            ImportError::MissingCategories(keys) => {
                write!(f, "Invalid project structure: missing categories {}", keys.join(", "))
            }
            ImportError::MalformedCategory(key) => {
                write!(f, "Invalid project structure: '{}' is not a list", key)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::ParseError(e)
    }
}

/// A validated import: the replacement document and, when the file carried
/// a compatible backup, the history log to restore.
#[derive(Debug, Clone)]
pub struct ImportPayload {
    pub document: Document,
    pub history: Option<HistoryLog>,
}

/// Parses and validates an import file, envelope or bare document.
pub fn parse_import(raw: &str) -> Result<ImportPayload, ImportError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let (document_value, history) = match value.get("projectData") {
        Some(project) => {
            let history = match value.get("historyBackup") {
                Some(backup) if !backup.is_null() => {
                    match serde_json::from_value::<HistoryLog>(backup.clone()) {
                        Ok(log) => Some(log),
                        Err(e) => {
                            // Incompatible backups are dropped, not fatal;
                            // the document itself is still importable.
                            tracing::warn!("Ignoring incompatible history backup: {}", e);
                            None
                        }
                    }
                }
                _ => None,
            };
            (project.clone(), history)
        }
        None => (value, None),
    };

    validate_structure(&document_value)?;
    let document: Document = serde_json::from_value(document_value)?;

    Ok(ImportPayload { document, history })
}

/// Checks that all five category keys are present and each maps to a
/// sequence.
fn validate_structure(value: &serde_json::Value) -> Result<(), ImportError> {
    let map = match value.as_object() {
        Some(map) => map,
        None => {
            return Err(ImportError::MissingCategories(
                ALL_CATEGORIES.iter().map(|c| c.key()).collect(),
            ))
        }
    };

    let missing: Vec<&'static str> = ALL_CATEGORIES
        .iter()
        .map(|c| c.key())
        .filter(|key| !map.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingCategories(missing));
    }

    for category in ALL_CATEGORIES {
        if !map[category.key()].is_array() {
            return Err(ImportError::MalformedCategory(category.key()));
        }
    }
    Ok(())
}
