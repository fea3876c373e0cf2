//! Recent search queries, most recent first.

use serde_json::Value;

use crate::store::{KeyValueStore, StoreError};

/// Store key holding the history list.
pub const SEARCH_HISTORY_KEY: &str = "markdown-kb:search-history";

/// Default number of remembered queries.
pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// Bounded list of recent search queries over a [`KeyValueStore`].
///
/// # Example
///
/// ```
/// use kb_history::{MemoryStore, SearchHistory};
///
/// let mut history = SearchHistory::new(MemoryStore::new());
/// history.add("  rust  ").unwrap();
/// history.add("tokio").unwrap();
/// history.add("rust").unwrap();
/// assert_eq!(history.entries(), ["rust", "tokio"]);
/// ```
#[derive(Debug)]
pub struct SearchHistory<S> {
    store: S,
    max_entries: usize,
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Limit the number of remembered queries (at least one is kept).
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Stored queries, most recent first.
    ///
    /// Missing or malformed data reads as an empty history.
    pub fn entries(&self) -> Vec<String> {
        match self.store.get(SEARCH_HISTORY_KEY) {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(query) => Some(query),
                    _ => None,
                })
                .collect(),
            Some(other) => {
                tracing::debug!(value = %other, "Ignoring malformed search history");
                Vec::new()
            }
        }
    }

    /// Record a query.
    ///
    /// The query is trimmed; blank queries are ignored. An identical earlier
    /// entry moves to the front instead of being duplicated, and the list is
    /// cut to the configured maximum.
    pub fn add(&mut self, query: &str) -> Result<(), StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries();
        entries.retain(|existing| existing != query);
        entries.insert(0, query.to_owned());
        entries.truncate(self.max_entries);

        self.store.set(SEARCH_HISTORY_KEY, Value::from(entries))
    }

    /// Forget all queries.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(SEARCH_HISTORY_KEY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn history() -> SearchHistory<MemoryStore> {
        SearchHistory::new(MemoryStore::new())
    }

    #[test]
    fn test_empty_history() {
        assert!(history().entries().is_empty());
    }

    #[test]
    fn test_most_recent_first() {
        let mut h = history();
        h.add("first").unwrap();
        h.add("second").unwrap();
        assert_eq!(h.entries(), vec!["second", "first"]);
    }

    #[test]
    fn test_trims_and_rejects_blank() {
        let mut h = history();
        h.add("  query  ").unwrap();
        h.add("").unwrap();
        h.add("   \t").unwrap();
        assert_eq!(h.entries(), vec!["query"]);
    }

    #[test]
    fn test_duplicate_moves_to_front() {
        let mut h = history();
        h.add("a").unwrap();
        h.add("b").unwrap();
        h.add("c").unwrap();
        h.add("a").unwrap();
        assert_eq!(h.entries(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let mut h = history();
        h.add("Rust").unwrap();
        h.add("rust").unwrap();
        assert_eq!(h.entries(), vec!["rust", "Rust"]);
    }

    #[test]
    fn test_capped_at_ten() {
        let mut h = history();
        for i in 0..15 {
            h.add(&format!("q{i}")).unwrap();
        }
        let entries = h.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0], "q14");
        assert_eq!(entries[9], "q5");
    }

    #[test]
    fn test_custom_limit() {
        let mut h = history().with_max_entries(2);
        for q in ["a", "b", "c"] {
            h.add(q).unwrap();
        }
        assert_eq!(h.entries(), vec!["c", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut h = history();
        h.add("a").unwrap();
        h.clear().unwrap();
        assert!(h.entries().is_empty());
        assert_eq!(h.store().get(SEARCH_HISTORY_KEY), None);
    }

    #[test]
    fn test_corrupt_value_reads_empty() {
        let mut store = MemoryStore::new();
        store.set(SEARCH_HISTORY_KEY, json!({"not": "a list"})).unwrap();
        let mut h = SearchHistory::new(store);
        assert!(h.entries().is_empty());

        h.add("fresh").unwrap();
        assert_eq!(h.entries(), vec!["fresh"]);
    }

    #[test]
    fn test_non_string_items_dropped() {
        let mut store = MemoryStore::new();
        store
            .set(SEARCH_HISTORY_KEY, json!(["ok", 1, null, "also"]))
            .unwrap();
        assert_eq!(SearchHistory::new(store).entries(), vec!["ok", "also"]);
    }

    #[test]
    fn test_stored_shape() {
        let mut h = history();
        h.add("x").unwrap();
        assert_eq!(h.into_inner().get(SEARCH_HISTORY_KEY), Some(json!(["x"])));
    }
}
