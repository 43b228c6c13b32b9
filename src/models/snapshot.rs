use serde::{Deserialize, Serialize};

use super::document::Document;

/// An immutable recorded copy of the document at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    /// Milliseconds since epoch.
    pub timestamp: i64,
    /// Human-readable cause of the save.
    pub description: String,
    pub data: Document,
    pub location_url: String,
}

/// The persisted append-only log of snapshots, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLog {
    pub entries: Vec<Snapshot>,
    pub current_state_id: Option<String>,
    /// Milliseconds since epoch when the log was first created.
    pub created_at: i64,
}

impl HistoryLog {
    pub fn new(created_at: i64) -> Self {
        Self {
            entries: Vec::new(),
            current_state_id: None,
            created_at,
        }
    }

    /// Most recent snapshot, if any.
    pub fn newest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_json_field_names() {
        let log = HistoryLog::new(1700000000000);
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"currentStateId\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"entries\""));
    }

    #[test]
    fn test_snapshot_json_field_names() {
        let snapshot = Snapshot {
            id: "abc-123".to_string(),
            timestamp: 1700000000000,
            description: "Manual save".to_string(),
            data: Document::new(),
            location_url: "app://ideaboard?state=abc-123".to_string(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"locationUrl\""));
        assert!(json.contains("\"description\":\"Manual save\""));
    }

    #[test]
    fn test_newest_is_last_entry() {
        let mut log = HistoryLog::new(0);
        assert!(log.newest().is_none());
        for i in 0..3 {
            log.entries.push(Snapshot {
                id: format!("snap-{}", i),
                timestamp: i,
                description: String::new(),
                data: Document::new(),
                location_url: String::new(),
            });
        }
        assert_eq!(log.newest().unwrap().id, "snap-2");
    }
}
