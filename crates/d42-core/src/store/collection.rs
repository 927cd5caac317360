// ── Memoized entity collection ──
//
// Keyed storage for one entity type. Empty until the first fetch; a fetch
// replaces the whole map. An empty result still counts as loaded.

use indexmap::IndexMap;

pub(crate) struct Collection<T> {
    entries: IndexMap<String, T>,
    loaded: bool,
}

impl<T> Collection<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            loaded: false,
        }
    }

    /// Whether an accessor must go to the server.
    pub(crate) fn needs_fetch(&self, reload: bool) -> bool {
        reload || !self.loaded
    }

    /// Replace every entry. On a key collision the later entity wins.
    pub(crate) fn replace(&mut self, entities: impl IntoIterator<Item = (String, T)>) {
        self.entries = entities.into_iter().collect();
        self.loaded = true;
    }

    pub(crate) fn entries(&self) -> &IndexMap<String, T> {
        &self.entries
    }

    pub(crate) fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fetch_counts_as_loaded() {
        let mut collection: Collection<u32> = Collection::new();
        assert!(collection.needs_fetch(false));
        collection.replace(Vec::new());
        assert!(!collection.needs_fetch(false));
        assert!(collection.needs_fetch(true));
    }

    #[test]
    fn replace_drops_stale_entries() {
        let mut collection = Collection::new();
        collection.replace(vec![("a".to_owned(), 1), ("b".to_owned(), 2)]);
        collection.replace(vec![("b".to_owned(), 3), ("b".to_owned(), 4)]);
        assert_eq!(collection.get("a"), None);
        assert_eq!(collection.get("b"), Some(&4));
        assert_eq!(collection.entries().len(), 1);
    }
}
