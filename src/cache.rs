//! AST cache collaborator
//!
//! A dependency-injected cache over parsed documents, keyed by document
//! identity plus a content snapshot. Repeated `get` calls on an unchanged
//! document return the identical `Arc` instance; an explicit `clear`
//! guarantees the next `get` re-parses. Eviction is bounded-size with a
//! time-to-live: expired entries go first, then the least recently used.
//!
//! The cache is never ambient state; callers construct one and pass it
//! where needed.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::ast::Ast;
use crate::parser;

/// Misuse of the cache registry boundary.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cache registered under name '{0}'")]
    UnknownCache(String),
}

#[derive(Debug)]
struct Entry {
    snapshot: u64,
    len: usize,
    ast: Arc<Ast>,
    last_access: Instant,
}

/// Bounded, TTL-evicting cache of parsed documents.
#[derive(Debug)]
pub struct AstCache {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<String, Entry>,
}

impl AstCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
        }
    }

    /// The parsed AST for `key`. Re-parses when the content snapshot
    /// changed or the entry expired; otherwise returns the cached
    /// instance.
    pub fn get(&mut self, key: &str, text: &str) -> Arc<Ast> {
        let snapshot = snapshot_of(text);
        let now = Instant::now();
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.snapshot == snapshot
                && entry.len == text.len()
                && now.duration_since(entry.last_access) <= self.ttl
            {
                entry.last_access = now;
                return Arc::clone(&entry.ast);
            }
        }
        let ast = Arc::new(parser::parse(text));
        self.entries.insert(
            key.to_string(),
            Entry {
                snapshot,
                len: text.len(),
                ast: Arc::clone(&ast),
                last_access: now,
            },
        );
        self.evict(now);
        ast
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict(&mut self, now: Instant) {
        if self.entries.len() <= self.capacity {
            return;
        }
        let ttl = self.ttl;
        self.entries
            .retain(|_, e| now.duration_since(e.last_access) <= ttl);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

/// Named cache registry for hosts managing several documents sets.
/// Operating on an unregistered name is a caller bug and errors loudly.
#[derive(Default)]
pub struct CacheRegistry {
    caches: HashMap<String, AstCache>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, cache: AstCache) {
        self.caches.insert(name.to_string(), cache);
    }

    pub fn cache_mut(&mut self, name: &str) -> Result<&mut AstCache, CacheError> {
        self.caches
            .get_mut(name)
            .ok_or_else(|| CacheError::UnknownCache(name.to_string()))
    }
}

fn snapshot_of(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_document_returns_identical_instance() {
        let mut cache = AstCache::new(4, Duration::from_secs(60));
        let a = cache.get("doc.thrift", "struct S { 1: i32 x }");
        let b = cache.get("doc.thrift", "struct S { 1: i32 x }");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn changed_content_reparses() {
        let mut cache = AstCache::new(4, Duration::from_secs(60));
        let a = cache.get("doc.thrift", "struct S { 1: i32 x }");
        let b = cache.get("doc.thrift", "struct S { 1: i32 y }");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn clear_forces_a_fresh_instance() {
        let mut cache = AstCache::new(4, Duration::from_secs(60));
        let a = cache.get("doc.thrift", "struct S {}");
        cache.clear();
        let b = cache.get("doc.thrift", "struct S {}");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let mut cache = AstCache::new(2, Duration::from_secs(60));
        cache.get("a", "struct A {}");
        cache.get("b", "struct B {}");
        cache.get("c", "struct C {}");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn registry_errors_on_unknown_name() {
        let mut registry = CacheRegistry::new();
        registry.register("workspace", AstCache::new(4, Duration::from_secs(60)));
        assert!(registry.cache_mut("workspace").is_ok());
        let err = registry.cache_mut("nope").unwrap_err();
        assert_eq!(err.to_string(), "no cache registered under name 'nope'");
    }
}
