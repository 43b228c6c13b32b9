//! The append-only, capacity-bounded snapshot log.

use crate::models::{Document, HistoryLog, Snapshot};

use super::session::{SessionStore, StoreWriteError};

/// Maximum number of snapshots retained; the oldest are evicted first.
pub const MAX_ENTRIES: usize = 50;

/// Session store key holding the serialized history log.
const STORAGE_KEY: &str = "ideaboard-history";

/// Read-only summary of the log for display.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total_entries: usize,
    pub oldest_timestamp: Option<i64>,
    pub newest_timestamp: Option<i64>,
    pub current_state_id: Option<String>,
}

/// Durable (session-lifetime) log of document snapshots.
///
/// Exclusively owns the [`HistoryLog`]; other components read snapshots or
/// request mutations through this API, never by touching the log directly.
pub struct SnapshotStore {
    store: Box<dyn SessionStore>,
    log: HistoryLog,
}

impl SnapshotStore {
    /// Opens a store over `store`, loading any previously persisted log.
    ///
    /// Missing or corrupt data yields a fresh empty log: with no server-side
    /// source of truth, recovery is best-effort and silent.
    pub fn open(store: Box<dyn SessionStore>, now_ms: i64) -> Self {
        let log = match store.get(STORAGE_KEY) {
            Some(raw) => match serde_json::from_str::<HistoryLog>(&raw) {
                Ok(log) => log,
                Err(e) => {
                    tracing::warn!("Discarding corrupt history log: {}", e);
                    HistoryLog::new(now_ms)
                }
            },
            None => HistoryLog::new(now_ms),
        };
        Self { store, log }
    }

    /// Deep-copies `document` into a new snapshot, appends it, and persists
    /// the whole log. Evicts from the front until there is room for exactly
    /// one more entry, so the log never exceeds [`MAX_ENTRIES`].
    ///
    /// A failed store write leaves the log as it was and is reported to the
    /// caller, who retries on the next save trigger.
    pub fn append(
        &mut self,
        document: &Document,
        description: &str,
        location_url: &str,
        now_ms: i64,
    ) -> Result<String, StoreWriteError> {
        let id = new_snapshot_id(now_ms);

        let mut candidate = self.log.clone();
        while candidate.entries.len() >= MAX_ENTRIES {
            candidate.entries.remove(0);
        }
        candidate.entries.push(Snapshot {
            id: id.clone(),
            timestamp: now_ms,
            description: description.to_string(),
            data: document.clone(),
            location_url: location_url.to_string(),
        });
        candidate.current_state_id = Some(id.clone());

        let serialized = serde_json::to_string(&candidate)
            .expect("history log serialization cannot fail");
        self.store.set(STORAGE_KEY, &serialized)?;

        tracing::debug!(snapshot = %id, entries = candidate.entries.len(), "Appended snapshot: {}", description);
        self.log = candidate;
        Ok(id)
    }

    /// Linear scan of the log; acceptable at a 50-entry cap.
    pub fn find_by_id(&self, id: &str) -> Option<&Snapshot> {
        self.log.entries.iter().find(|snapshot| snapshot.id == id)
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    /// Removes the persisted log entirely and resets to an empty one.
    pub fn clear(&mut self, now_ms: i64) {
        self.store.remove(STORAGE_KEY);
        self.log = HistoryLog::new(now_ms);
    }

    /// Replaces the whole log, e.g. when restoring an imported backup.
    pub fn replace_log(&mut self, log: HistoryLog) -> Result<(), StoreWriteError> {
        let serialized =
            serde_json::to_string(&log).expect("history log serialization cannot fail");
        self.store.set(STORAGE_KEY, &serialized)?;
        self.log = log;
        Ok(())
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total_entries: self.log.entries.len(),
            oldest_timestamp: self.log.entries.first().map(|s| s.timestamp),
            newest_timestamp: self.log.entries.last().map(|s| s.timestamp),
            current_state_id: self.log.current_state_id.clone(),
        }
    }
}

/// Snapshot ids only need to avoid collision within a session: current time
/// in hex plus a random suffix.
fn new_snapshot_id(now_ms: i64) -> String {
    let suffix: u32 = rand::random::<u32>() & 0x00ff_ffff;
    format!("{:x}-{:06x}", now_ms, suffix)
}
