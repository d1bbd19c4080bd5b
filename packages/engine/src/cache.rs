//! Per-object member cache.
//!
//! Entries are keyed by member name. The cache remembers the document revision it
//! was last consistent with; any mutation it did not acknowledge (made through the
//! raw tree, or through another object on the same document) drops every entry on
//! the next lookup.
//!
//! Nested objects are held weakly. Once every handle a caller obtained for a cached
//! object is dropped, its entry no longer upgrades and the next read projects a
//! fresh object with a fresh cache of its own.

use crate::value::Value;
use crate::wrapper::WeakObject;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from the cache
    pub hits: u64,
    /// Reads that went through classification and projection
    pub misses: u64,
}

#[derive(Debug)]
enum Entry {
    Plain(Value),
    Object(WeakObject),
    List(Vec<Entry>),
}

impl Entry {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(object) => Entry::Object(object.downgrade()),
            Value::List(items) => Entry::List(items.into_iter().map(Entry::from_value).collect()),
            plain => Entry::Plain(plain),
        }
    }

    /// `None` once any object held by the entry was collected or lost its element
    fn upgrade(&self) -> Option<Value> {
        match self {
            Entry::Plain(value) => Some(value.clone()),
            Entry::Object(object) => object.upgrade().map(Value::Object),
            Entry::List(items) => items
                .iter()
                .map(Entry::upgrade)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemberCache {
    entries: HashMap<String, Entry>,
    revision: Option<u64>,
    stats: CacheStats,
}

impl MemberCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry if the document changed since the last acknowledged revision
    pub fn sync(&mut self, revision: u64) {
        if self.revision != Some(revision) {
            if !self.entries.is_empty() {
                trace!(
                    entries = self.entries.len(),
                    revision,
                    "Document changed, clearing member cache"
                );
            }
            self.entries.clear();
            self.revision = Some(revision);
        }
    }

    /// Record a mutation made through this cache's owner
    pub fn acknowledge(&mut self, revision: u64) {
        self.revision = Some(revision);
    }

    /// Cached value for `name`. Entries holding objects that were collected, or
    /// whose element is gone, are discarded and reported as a miss.
    pub fn lookup(&mut self, name: &str) -> Option<Value> {
        match self.entries.get(name).map(Entry::upgrade) {
            Some(Some(value)) => {
                self.stats.hits += 1;
                trace!(member = %name, "Member cache hit");
                Some(value)
            }
            Some(None) => {
                trace!(member = %name, "Cached object was released");
                self.entries.remove(name);
                self.stats.misses += 1;
                None
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn store(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), Entry::from_value(value));
    }

    pub fn evict(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Primitive;
    use crate::wrapper::XmlObject;

    #[test]
    fn test_hits_and_misses() {
        let mut cache = MemberCache::new();
        cache.sync(1);
        assert!(cache.lookup("a").is_none());
        cache.store("a", Value::from(1i32));
        assert_eq!(cache.lookup("a"), Some(Value::Primitive(Primitive::I32(1))));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_revision_change_clears() {
        let mut cache = MemberCache::new();
        cache.sync(1);
        cache.store("a", Value::from("x"));
        cache.sync(1);
        assert!(cache.contains("a"));
        cache.sync(2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_acknowledged_revision_keeps_entries() {
        let mut cache = MemberCache::new();
        cache.sync(1);
        cache.store("a", Value::from("x"));
        cache.acknowledge(3);
        cache.sync(3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict() {
        let mut cache = MemberCache::new();
        cache.store("a", Value::from("x"));
        cache.store("b", Value::from("y"));
        cache.evict("a");
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_dropped_object_is_a_miss() {
        let root = XmlObject::parse("<r><a><b>1</b></a></r>").unwrap();
        let a = root.get("a").unwrap();

        let mut cache = MemberCache::new();
        cache.store("a", a.clone());
        cache.store("list", Value::List(vec![a.clone(), Value::from(1i32)]));
        assert_eq!(cache.lookup("a"), Some(a.clone()));
        assert!(cache.lookup("list").is_some());

        drop(a);
        assert!(cache.lookup("a").is_none());
        assert!(cache.lookup("list").is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 2 });
    }
}
