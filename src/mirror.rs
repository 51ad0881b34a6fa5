//! In-process mirror of store keys.
//!
//! The store stays authoritative. A mirror only answers existence checks
//! without a round trip, so it is filled once from a full scan before the
//! server takes traffic and then kept current by the owning component.

use std::collections::HashSet;

use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct KeyMirror {
    keys: RwLock<HashSet<String>>,
}

impl KeyMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirrored keys with a fresh scan. Returns the new size.
    pub fn reload<I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let fresh: HashSet<String> = keys.into_iter().collect();
        let len = fresh.len();
        *self.keys.write() = fresh;
        len
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.read().contains(key)
    }

    pub fn insert(&self, key: &str) {
        self.keys.write().insert(key.to_string());
    }

    pub fn remove(&self, key: &str) -> bool {
        self.keys.write().remove(key)
    }

    /// True if any mirrored key is a substring of `haystack`
    pub fn any_contained_in(&self, haystack: &str) -> bool {
        self.keys.read().iter().any(|key| haystack.contains(key.as_str()))
    }

    /// Sorted copy of the mirrored keys
    pub fn snapshot(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.read().iter().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_replaces_previous_keys() {
        let mirror = KeyMirror::new();
        mirror.insert("stale");

        let len = mirror.reload(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(len, 2);
        assert!(!mirror.contains("stale"));
        assert!(mirror.contains("a"));
        assert!(mirror.contains("b"));
    }

    #[test]
    fn test_insert_and_remove() {
        let mirror = KeyMirror::new();
        assert!(mirror.snapshot().is_empty());

        mirror.insert("abc12");
        assert!(mirror.contains("abc12"));
        assert_eq!(mirror.snapshot(), vec!["abc12"]);

        assert!(mirror.remove("abc12"));
        assert!(!mirror.remove("abc12"));
        assert!(!mirror.contains("abc12"));
    }

    #[test]
    fn test_any_contained_in() {
        let mirror = KeyMirror::new();
        mirror.insert("badsite");

        assert!(mirror.any_contained_in("https://www.badsite.com/page"));
        assert!(!mirror.any_contained_in("https://example.com"));
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mirror = KeyMirror::new();
        mirror.insert("zeta");
        mirror.insert("alpha");
        mirror.insert("mid");

        assert_eq!(mirror.snapshot(), vec!["alpha", "mid", "zeta"]);
    }
}
