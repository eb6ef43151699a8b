//! Search domain models.

use serde::Serialize;
use std::collections::HashSet;

use crate::document::Document;

/// Insertion-ordered set of document ids.
///
/// Intersections keep the order of the first set, so the set remembers the
/// order in which ids were first seen.
#[derive(Debug, Clone, Default)]
pub struct IdSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an id; returns false when it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for IdSet {}

impl<S: Into<String>> FromIterator<S> for IdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IdSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for IdSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

/// Lifecycle of a query session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SearchStatus {
    /// No query, or the query was cleared
    #[default]
    Idle,
    /// A search is in flight
    Loading,
    /// The last search completed
    Success,
    /// The last search failed; carries the user-facing message
    Error(String),
}

/// Snapshot of the coordinator state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SearchState {
    /// The current query text
    pub query: String,

    /// Current result set, at most [`super::MAX_RESULTS`] documents
    pub results: Vec<Document>,

    /// Where the session is in its lifecycle
    pub status: SearchStatus,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, SearchStatus::Loading)
    }

    /// User-facing error message, if the last search failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_set_keeps_first_insertion_order() {
        let mut set: IdSet = ["3", "1", "2"].into_iter().collect();
        assert!(!set.insert("1"));
        assert!(set.insert("4"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["3", "1", "2", "4"]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_id_set_equality_ignores_order() {
        let a: IdSet = ["1", "2"].into_iter().collect();
        let b: IdSet = ["2", "1"].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = SearchState::default();
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert!(state.results.is_empty());
        assert_eq!(state.status, SearchStatus::Idle);
    }
}
