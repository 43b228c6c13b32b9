//! The navigable-history collaborator: an externally supplied service with
//! push/replace semantics and back/forward traversal.

use crate::models::Document;

/// State attached to a navigation entry.
///
/// Carries the snapshot id and, redundantly, the document itself so a
/// back/forward replay does not need a store lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct NavState {
    pub state_id: String,
    pub data: Document,
}

/// A back/forward navigation event. `state` is absent for entries that were
/// never given one.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEvent {
    pub state: Option<NavState>,
    pub url: String,
}

/// Push/replace entries with state and an address, and traverse them.
pub trait NavigationHistory {
    fn push_state(&mut self, state: NavState, url: &str);
    fn replace_state(&mut self, state: NavState, url: &str);
    fn current_url(&self) -> Option<String>;
    /// Move one entry back, reporting the entry navigated to.
    fn back(&mut self) -> Option<NavEvent>;
    /// Move one entry forward, reporting the entry navigated to.
    fn forward(&mut self) -> Option<NavEvent>;
}

/// In-memory history stack used by the interactive session and tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Vec<(Option<NavState>, String)>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the stack with a stateless entry at `url`, like a page load.
    pub fn with_initial_url(url: impl Into<String>) -> Self {
        Self {
            entries: vec![(None, url.into())],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NavigationHistory for MemoryHistory {
    fn push_state(&mut self, state: NavState, url: &str) {
        // Pushing discards any forward entries.
        self.entries.truncate(self.cursor + 1);
        self.entries.push((Some(state), url.to_string()));
        self.cursor = self.entries.len() - 1;
    }

    fn replace_state(&mut self, state: NavState, url: &str) {
        if self.entries.is_empty() {
            self.entries.push((Some(state), url.to_string()));
            self.cursor = 0;
        } else {
            self.entries[self.cursor] = (Some(state), url.to_string());
        }
    }

    fn current_url(&self) -> Option<String> {
        self.entries.get(self.cursor).map(|(_, url)| url.clone())
    }

    fn back(&mut self) -> Option<NavEvent> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let (state, url) = &self.entries[self.cursor];
        Some(NavEvent {
            state: state.clone(),
            url: url.clone(),
        })
    }

    fn forward(&mut self) -> Option<NavEvent> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        let (state, url) = &self.entries[self.cursor];
        Some(NavEvent {
            state: state.clone(),
            url: url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str) -> NavState {
        NavState {
            state_id: id.to_string(),
            data: Document::new(),
        }
    }

    #[test]
    fn test_back_and_forward() {
        let mut history = MemoryHistory::with_initial_url("app://x");
        history.push_state(state("a"), "app://x?state=a");
        history.push_state(state("b"), "app://x?state=b");

        let event = history.back().unwrap();
        assert_eq!(event.state.unwrap().state_id, "a");

        let event = history.back().unwrap();
        assert!(event.state.is_none());
        assert_eq!(event.url, "app://x");
        assert!(history.back().is_none());

        let event = history.forward().unwrap();
        assert_eq!(event.state.unwrap().state_id, "a");
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut history = MemoryHistory::with_initial_url("app://x");
        history.push_state(state("a"), "app://x?state=a");
        history.push_state(state("b"), "app://x?state=b");
        history.back();

        history.push_state(state("c"), "app://x?state=c");
        assert!(history.forward().is_none());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_url().unwrap(), "app://x?state=c");
    }

    #[test]
    fn test_replace_keeps_stack_depth() {
        let mut history = MemoryHistory::with_initial_url("app://x");
        history.replace_state(state("a"), "app://x?state=a");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_url().unwrap(), "app://x?state=a");
    }

    #[test]
    fn test_replace_on_empty_stack() {
        let mut history = MemoryHistory::new();
        history.replace_state(state("a"), "app://x?state=a");
        assert_eq!(history.len(), 1);
    }
}
