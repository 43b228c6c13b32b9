//! The single in-memory source of truth for the live document, and the
//! arbiter between immediate and deferred persistence.

use std::sync::Arc;

use crate::history::{HistoryBridge, NavEvent, Resolution};
use crate::models::{Category, Document, Item, ItemField};
use crate::store::SnapshotStore;

use super::clock::Clock;
use super::export::{parse_import, ExportEnvelope, ExportMetadata, ImportError};

/// Debounce window: a burst of edits within this many ms collapses into one
/// snapshot.
pub const DEBOUNCE_MS: i64 = 1000;

/// Period of the connectivity-gated auto-save.
pub const AUTOSAVE_INTERVAL_MS: i64 = 30_000;

const AUTOSAVE_DESCRIPTION: &str = "Periodic auto-save";

/// Errors from document mutations, surfaced to the caller for feedback.
#[derive(Debug, PartialEq, Eq)]
pub enum ControllerError {
    ItemNotFound { category: Category, id: i64 },
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::ItemNotFound { category, id } => {
                write!(f, "No item with id {} in {}", id, category)
            }
        }
    }
}

impl std::error::Error for ControllerError {}

/// A save waiting out its debounce window. Last writer wins: scheduling a
/// new save replaces the pending one entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub description: String,
    pub deadline_ms: i64,
}

/// First step of the two-phase reset: what will be lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOverview {
    pub total_items: usize,
    pub sections_with_content: usize,
    pub history_entries: usize,
}

/// Second step of the two-phase reset; only obtainable by confirming the
/// overview, so a reset cannot be executed with a single acknowledgement.
#[derive(Debug)]
pub struct ResetFinal {
    _sealed: (),
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_items: usize,
    pub history_restored: bool,
}

pub struct DocumentController {
    document: Document,
    store: SnapshotStore,
    bridge: HistoryBridge,
    clock: Arc<dyn Clock>,
    project_name: String,
    online: bool,
    pending: Option<PendingSave>,
    next_autosave_ms: i64,
    recorded_any: bool,
}

impl DocumentController {
    /// Builds a controller, resolving the starting document from the
    /// initial address, the persisted log, or an empty document, in that
    /// order.
    pub fn new(
        store: SnapshotStore,
        bridge: HistoryBridge,
        clock: Arc<dyn Clock>,
        project_name: impl Into<String>,
        initial_url: Option<&str>,
    ) -> Self {
        let resolution = HistoryBridge::resolve_initial(initial_url, &store);
        let now_ms = clock.now_ms();
        tracing::debug!(from = ?resolution.resolved_from, "Resolved initial document");
        Self {
            document: resolution.document,
            store,
            bridge,
            clock,
            project_name: project_name.into(),
            online: true,
            pending: None,
            next_autosave_ms: now_ms + AUTOSAVE_INTERVAL_MS,
            recorded_any: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn pending_save(&self) -> Option<&PendingSave> {
        self.pending.as_ref()
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Online/offline notification. Connectivity gates only the periodic
    /// auto-save; edits and debounced/immediate saves are unaffected.
    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            tracing::info!("Connectivity changed: {}", if online { "online" } else { "offline" });
        }
        self.online = online;
    }

    /// Creates an item with the category's default title and schedules a
    /// debounced save. Returns the new item.
    pub fn add_item(&mut self, category: Category) -> Item {
        let now_ms = self.clock.now_ms();
        let id = self.document.next_item_id(now_ms);
        let item = Item::new(category, id, self.clock.now());
        self.document.items_mut(category).push(item.clone());
        self.schedule_save(format!("Added '{}' to {}", item.title, category));
        item
    }

    /// Applies a field edit. Scheduling a save only when the value actually
    /// changed keeps no-op edits out of the history.
    pub fn update_item(
        &mut self,
        category: Category,
        id: i64,
        field: ItemField,
        value: &str,
    ) -> Result<bool, ControllerError> {
        let item = self
            .document
            .find_item_mut(category, id)
            .ok_or(ControllerError::ItemNotFound { category, id })?;

        if !field.apply(item, value) {
            return Ok(false);
        }
        let title = item.title.clone();
        self.schedule_save(format!("Updated {} of '{}'", field, title));
        Ok(true)
    }

    /// Removes an item and saves immediately: deletion is destructive and
    /// must not be lost to a later debounce collision. Returns the deleted
    /// title for feedback.
    pub fn delete_item(&mut self, category: Category, id: i64) -> Result<String, ControllerError> {
        let items = self.document.items_mut(category);
        let position = items
            .iter()
            .position(|item| item.id == id)
            .ok_or(ControllerError::ItemNotFound { category, id })?;
        let removed = items.remove(position);

        self.flush_save(&format!("Deleted '{}'", removed.title));
        Ok(removed.title)
    }

    /// Debounced save: replaces any pending save and restarts the window,
    /// so only the last description of a burst is recorded.
    pub fn schedule_save(&mut self, description: impl Into<String>) {
        self.pending = Some(PendingSave {
            description: description.into(),
            deadline_ms: self.clock.now_ms() + DEBOUNCE_MS,
        });
    }

    /// Unconditional immediate save, bypassing the debounce timer.
    ///
    /// A failed store write is non-fatal: the save is re-queued as a
    /// pending debounced save so the next tick or user action retries it.
    pub fn flush_save(&mut self, description: &str) -> Option<String> {
        self.pending = None;
        let now_ms = self.clock.now_ms();
        let location_url = self.bridge.current_url().unwrap_or_default();

        match self.store.append(&self.document, description, &location_url, now_ms) {
            Ok(id) => {
                let replace = !self.recorded_any;
                self.bridge.record(&id, &self.document, replace);
                self.recorded_any = true;
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Save failed, will retry: {}", e);
                self.pending = Some(PendingSave {
                    description: description.to_string(),
                    deadline_ms: now_ms + DEBOUNCE_MS,
                });
                None
            }
        }
    }

    /// Driver tick: fires the pending debounced save once its deadline has
    /// passed, and the periodic auto-save every 30 s while online. Offline,
    /// the periodic slot is skipped but the schedule keeps advancing.
    pub fn tick(&mut self) {
        let now_ms = self.clock.now_ms();

        if let Some(pending) = &self.pending {
            if now_ms >= pending.deadline_ms {
                let description = pending.description.clone();
                self.flush_save(&description);
            }
        }

        if now_ms >= self.next_autosave_ms {
            self.next_autosave_ms = now_ms + AUTOSAVE_INTERVAL_MS;
            if self.online {
                self.flush_save(AUTOSAVE_DESCRIPTION);
            } else {
                tracing::debug!("Offline, skipping periodic auto-save");
            }
        }
    }

    /// Flushes any pending work; the page-unload analog.
    pub fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.flush_save(&pending.description);
        }
    }

    /// Replays the previous navigation entry, replacing the live document.
    pub fn navigate_back(&mut self) -> Option<Resolution> {
        let event = self.bridge.back()?;
        Some(self.apply_navigation(&event))
    }

    /// Replays the next navigation entry, replacing the live document.
    pub fn navigate_forward(&mut self) -> Option<Resolution> {
        let event = self.bridge.forward()?;
        Some(self.apply_navigation(&event))
    }

    /// Applies an externally observed back/forward event.
    pub fn handle_navigation(&mut self, event: &NavEvent) -> Resolution {
        self.apply_navigation(event)
    }

    fn apply_navigation(&mut self, event: &NavEvent) -> Resolution {
        let resolution = HistoryBridge::resolve_event(event, &self.store);
        self.document = resolution.document.clone();
        // Edits made before navigating describe a document that no longer
        // exists; drop them rather than snapshot the replayed state.
        self.pending = None;
        resolution
    }

    /// Builds the export envelope for the current state.
    pub fn export(&self) -> ExportEnvelope {
        let exported_at = self.clock.now().to_rfc3339();
        let log = self.store.log();
        let last_update = log
            .newest()
            .and_then(|s| chrono::DateTime::from_timestamp_millis(s.timestamp))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| exported_at.clone());

        ExportEnvelope {
            project_data: self.document.clone(),
            metadata: ExportMetadata {
                exported_at,
                project_name: self.project_name.clone(),
                version: "2.0".to_string(),
                total_items: self.document.total_items(),
                history_entries: log.entries.len(),
                last_update,
            },
            history_backup: Some(log.clone()),
        }
    }

    /// Validates and applies an import file. On failure nothing is touched;
    /// on success the document (and, when supplied, the history log) is
    /// replaced and a flush save records the import.
    pub fn import(&mut self, raw: &str) -> Result<ImportSummary, ImportError> {
        let payload = parse_import(raw)?;

        self.document = payload.document;
        let history_restored = match payload.history {
            Some(log) => match self.store.replace_log(log) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Could not persist imported history: {}", e);
                    false
                }
            },
            None => false,
        };

        self.pending = None;
        self.flush_save("Imported project file");

        Ok(ImportSummary {
            total_items: self.document.total_items(),
            history_restored,
        })
    }

    /// First reset confirmation: an overview of what will be lost.
    pub fn request_reset(&self) -> ResetOverview {
        ResetOverview {
            total_items: self.document.total_items(),
            sections_with_content: self.document.sections_with_content(),
            history_entries: self.store.log().entries.len(),
        }
    }

    /// Second confirmation, consuming the overview acknowledgement.
    pub fn confirm_reset(&self, _overview: ResetOverview) -> ResetFinal {
        ResetFinal { _sealed: () }
    }

    /// Executes the reset: empties all five categories, clears the history
    /// log, and records a fresh baseline snapshot.
    pub fn execute_reset(&mut self, _confirmation: ResetFinal) {
        self.document = Document::new();
        self.store.clear(self.clock.now_ms());
        self.pending = None;
        self.recorded_any = false;
        self.flush_save("Project reset");
    }
}
