//! Compile-once cache for constraint patterns
//!
//! Constraint patterns are a small, static set declared with the protected
//! operations, so entries are never evicted. The cache lives for the whole
//! process and is shared across every evaluation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::PatternError;

static SHARED: OnceLock<Arc<PatternCache>> = OnceLock::new();

/// Statistics about pattern cache usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of compiled patterns held
    pub entries: usize,
    /// Lookups served from the cache
    pub hits: usize,
    /// Lookups that had to compile (or failed to)
    pub misses: usize,
    /// Successful compilations
    pub compilations: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe cache mapping a pattern source to its compiled form
///
/// Patterns are compiled anchored, so `is_match` on a cached pattern is a
/// full-string match rather than a substring search.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: DashMap<String, Arc<Regex>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    compilations: AtomicUsize,
}

impl PatternCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache, created on first use and never torn down
    pub fn shared() -> Arc<PatternCache> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(PatternCache::new())))
    }

    /// Compiled, anchored form of `source`
    ///
    /// Compiles at most once per distinct source, even when many callers race
    /// on first use. Invalid sources are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `source` is not a valid regular expression
    pub fn compiled(&self, source: &str) -> Result<Arc<Regex>, PatternError> {
        if let Some(pattern) = self.patterns.get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(pattern.value()));
        }

        // The entry guard holds the shard lock, so a racing caller waits here
        // and then finds the occupied entry.
        match self.patterns.entry(source.to_string()) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let regex = compile_anchored(source)?;
                self.compilations.fetch_add(1, Ordering::Relaxed);
                debug!(pattern = source, "Compiled constraint pattern");
                Ok(Arc::clone(entry.insert(Arc::new(regex)).value()))
            }
        }
    }

    /// True if `value` fully matches `source`
    pub fn is_full_match(&self, source: &str, value: &str) -> Result<bool, PatternError> {
        Ok(self.compiled(source)?.is_match(value))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.patterns.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compilations: self.compilations.load(Ordering::Relaxed),
        }
    }
}

/// Compile `source` for full-string matching
///
/// The source must be a valid expression on its own. Otherwise a fragment
/// like `a)(b` would close the wrapping group and compile unanchored.
fn compile_anchored(source: &str) -> Result<Regex, PatternError> {
    Regex::new(source).map_err(|e| PatternError::new(source, &e))?;
    Regex::new(&format!("^(?:{})$", source)).map_err(|e| PatternError::new(source, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_not_substring() {
        let cache = PatternCache::new();
        assert!(cache.is_full_match("[a-zA-Z]+", "onlyLetters").unwrap());
        assert!(!cache.is_full_match("[a-zA-Z]+", "abc123").unwrap());
        assert!(!cache.is_full_match("[a-zA-Z]+", "1234").unwrap());
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let cache = PatternCache::new();
        assert!(cache.is_full_match("admin|user", "user").unwrap());
        assert!(!cache.is_full_match("admin|user", "superuser").unwrap());
        assert!(!cache.is_full_match("admin|user", "administrator").unwrap());
    }

    #[test]
    fn test_compiles_once() {
        let cache = PatternCache::new();
        let first = cache.compiled("[0-9]+").unwrap();
        let second = cache.compiled("[0-9]+").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.compilations, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unbalanced_source_rejected() {
        let cache = PatternCache::new();

        // Both compile once wrapped in `^(?:...)$`, neither is valid alone
        for source in ["a)(b", "x)|(.*"] {
            let err = cache.compiled(source).unwrap_err();
            assert_eq!(err.pattern, source);
            assert!(cache.is_full_match(source, "ab").is_err());
        }
        assert!(cache.is_empty());
        assert_eq!(cache.stats().compilations, 0);
    }

    #[test]
    fn test_invalid_pattern_not_cached() {
        let cache = PatternCache::new();
        let err = cache.compiled("[a-").unwrap_err();
        assert_eq!(err.pattern, "[a-");
        assert!(cache.is_empty());

        // Still reported on the next call
        assert!(cache.compiled("[a-").is_err());
        assert_eq!(cache.stats().compilations, 0);
    }

    #[test]
    fn test_shared_is_single_instance() {
        assert!(Arc::ptr_eq(&PatternCache::shared(), &PatternCache::shared()));
    }
}
