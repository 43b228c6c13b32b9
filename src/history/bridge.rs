//! Keeps the navigable address and back/forward stack in sync with the
//! snapshot log, and resolves which snapshot a given address selects.

use crate::models::Document;
use crate::store::SnapshotStore;

use super::navigation::{NavEvent, NavState, NavigationHistory};

/// Query parameter that addresses a snapshot.
const STATE_PARAM: &str = "state";

/// Where the initial document came from; the priority order is a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// A snapshot id in the address was found in the log.
    Address,
    /// Fell back to the most recent log entry.
    NewestEntry,
    /// Nothing usable; fresh empty document.
    Empty,
}

/// The document chosen on load or navigation, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub document: Document,
    pub snapshot_id: Option<String>,
    pub resolved_from: ResolvedFrom,
}

/// Maps snapshot ids to navigation-history entries and the address bar.
pub struct HistoryBridge {
    nav: Box<dyn NavigationHistory>,
    base_url: String,
}

impl HistoryBridge {
    pub fn new(nav: Box<dyn NavigationHistory>, base_url: impl Into<String>) -> Self {
        Self {
            nav,
            base_url: base_url.into(),
        }
    }

    /// Address encoding a snapshot id as the `state` query parameter.
    pub fn url_for(&self, snapshot_id: &str) -> String {
        format!(
            "{}?{}={}",
            self.base_url,
            STATE_PARAM,
            urlencoding::encode(snapshot_id)
        )
    }

    /// Extracts the `state` query parameter from an address, if present.
    pub fn state_id_from_url(url: &str) -> Option<String> {
        let (_, query) = url.split_once('?')?;
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == STATE_PARAM && !value.is_empty() {
                return Some(urlencoding::decode(value).ok()?.into_owned());
            }
        }
        None
    }

    /// Records a successful append as a navigation entry. The first entry of
    /// a page load replaces the current address; later ones push.
    pub fn record(&mut self, snapshot_id: &str, document: &Document, replace: bool) -> String {
        let url = self.url_for(snapshot_id);
        let state = NavState {
            state_id: snapshot_id.to_string(),
            data: document.clone(),
        };
        if replace {
            self.nav.replace_state(state, &url);
        } else {
            self.nav.push_state(state, &url);
        }
        url
    }

    pub fn current_url(&self) -> Option<String> {
        self.nav.current_url()
    }

    pub fn back(&mut self) -> Option<NavEvent> {
        self.nav.back()
    }

    pub fn forward(&mut self) -> Option<NavEvent> {
        self.nav.forward()
    }

    /// Resolves the starting document. Priority order: a snapshot id in the
    /// address that is found in the log, else the most recent log entry,
    /// else a fresh empty document.
    pub fn resolve_initial(url: Option<&str>, store: &SnapshotStore) -> Resolution {
        if let Some(id) = url.and_then(Self::state_id_from_url) {
            if let Some(snapshot) = store.find_by_id(&id) {
                return Resolution {
                    document: snapshot.data.clone(),
                    snapshot_id: Some(snapshot.id.clone()),
                    resolved_from: ResolvedFrom::Address,
                };
            }
            tracing::debug!(state = %id, "Snapshot in address not found, falling back");
        }
        Self::fallback(store)
    }

    /// Resolves a back/forward event: navigation state wins (no store
    /// lookup needed), then the address's snapshot id, then the fallback.
    pub fn resolve_event(event: &NavEvent, store: &SnapshotStore) -> Resolution {
        if let Some(state) = &event.state {
            return Resolution {
                document: state.data.clone(),
                snapshot_id: Some(state.state_id.clone()),
                resolved_from: ResolvedFrom::Address,
            };
        }
        if let Some(id) = Self::state_id_from_url(&event.url) {
            if let Some(snapshot) = store.find_by_id(&id) {
                return Resolution {
                    document: snapshot.data.clone(),
                    snapshot_id: Some(snapshot.id.clone()),
                    resolved_from: ResolvedFrom::Address,
                };
            }
        }
        Self::fallback(store)
    }

    fn fallback(store: &SnapshotStore) -> Resolution {
        match store.log().newest() {
            Some(snapshot) => Resolution {
                document: snapshot.data.clone(),
                snapshot_id: Some(snapshot.id.clone()),
                resolved_from: ResolvedFrom::NewestEntry,
            },
            None => Resolution {
                document: Document::new(),
                snapshot_id: None,
                resolved_from: ResolvedFrom::Empty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::navigation::MemoryHistory;
    use crate::models::{Category, Item};
    use crate::store::MemorySessionStore;
    use chrono::Utc;

    fn bridge() -> HistoryBridge {
        HistoryBridge::new(
            Box::new(MemoryHistory::with_initial_url("app://ideaboard")),
            "app://ideaboard",
        )
    }

    fn store_with_snapshots(descriptions: &[&str]) -> (SnapshotStore, Vec<String>) {
        let mut store = SnapshotStore::open(Box::new(MemorySessionStore::new()), 0);
        let mut ids = Vec::new();
        for (i, description) in descriptions.iter().enumerate() {
            let mut doc = Document::new();
            doc.items_mut(Category::Narrative)
                .push(Item::new(Category::Narrative, i as i64 + 1, Utc::now()));
            ids.push(store.append(&doc, description, "", i as i64).unwrap());
        }
        (store, ids)
    }

    #[test]
    fn test_url_roundtrip() {
        let bridge = bridge();
        let url = bridge.url_for("18c2-0aff11");
        assert_eq!(url, "app://ideaboard?state=18c2-0aff11");
        assert_eq!(
            HistoryBridge::state_id_from_url(&url).unwrap(),
            "18c2-0aff11"
        );
    }

    #[test]
    fn test_state_id_from_url_edge_cases() {
        assert!(HistoryBridge::state_id_from_url("app://ideaboard").is_none());
        assert!(HistoryBridge::state_id_from_url("app://ideaboard?state=").is_none());
        assert_eq!(
            HistoryBridge::state_id_from_url("app://x?tab=2&state=abc").unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_record_replace_then_push() {
        let mut bridge = bridge();
        let doc = Document::new();

        bridge.record("a", &doc, true);
        assert_eq!(bridge.current_url().unwrap(), "app://ideaboard?state=a");

        bridge.record("b", &doc, false);
        assert_eq!(bridge.current_url().unwrap(), "app://ideaboard?state=b");

        // Replace kept the stack at one entry, push grew it to two.
        let event = bridge.back().unwrap();
        assert_eq!(event.state.unwrap().state_id, "a");
        assert!(bridge.back().is_none());
    }

    #[test]
    fn test_resolve_initial_prefers_address() {
        let (store, ids) = store_with_snapshots(&["first", "second", "third"]);
        let url = format!("app://ideaboard?state={}", ids[0]);

        let resolution = HistoryBridge::resolve_initial(Some(&url), &store);
        assert_eq!(resolution.resolved_from, ResolvedFrom::Address);
        assert_eq!(resolution.snapshot_id.as_deref(), Some(ids[0].as_str()));
    }

    #[test]
    fn test_resolve_initial_unknown_id_falls_back_to_newest() {
        let (store, ids) = store_with_snapshots(&["first", "second"]);

        let resolution =
            HistoryBridge::resolve_initial(Some("app://ideaboard?state=missing"), &store);
        assert_eq!(resolution.resolved_from, ResolvedFrom::NewestEntry);
        assert_eq!(resolution.snapshot_id.as_deref(), Some(ids[1].as_str()));
    }

    #[test]
    fn test_resolve_initial_empty_log_yields_empty_document() {
        let store = SnapshotStore::open(Box::new(MemorySessionStore::new()), 0);

        let resolution =
            HistoryBridge::resolve_initial(Some("app://ideaboard?state=missing"), &store);
        assert_eq!(resolution.resolved_from, ResolvedFrom::Empty);
        assert_eq!(resolution.document, Document::new());
        assert!(resolution.snapshot_id.is_none());
    }

    #[test]
    fn test_resolve_event_uses_nav_state_without_store_lookup() {
        let store = SnapshotStore::open(Box::new(MemorySessionStore::new()), 0);
        let mut doc = Document::new();
        doc.items_mut(Category::Mechanics)
            .push(Item::new(Category::Mechanics, 9, Utc::now()));

        // State id deliberately absent from the store: the attached data
        // must still win.
        let event = NavEvent {
            state: Some(NavState {
                state_id: "ghost".to_string(),
                data: doc.clone(),
            }),
            url: "app://ideaboard?state=ghost".to_string(),
        };

        let resolution = HistoryBridge::resolve_event(&event, &store);
        assert_eq!(resolution.document, doc);
        assert_eq!(resolution.snapshot_id.as_deref(), Some("ghost"));
    }

    #[test]
    fn test_resolve_event_falls_back_to_store_lookup() {
        let (store, ids) = store_with_snapshots(&["only"]);

        let event = NavEvent {
            state: None,
            url: format!("app://ideaboard?state={}", ids[0]),
        };
        let resolution = HistoryBridge::resolve_event(&event, &store);
        assert_eq!(resolution.snapshot_id.as_deref(), Some(ids[0].as_str()));
        assert_eq!(resolution.resolved_from, ResolvedFrom::Address);
    }
}
