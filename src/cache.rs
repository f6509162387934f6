//! Memoization of transpiled output.

use crate::error::TranspileError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

/// Get-or-compute store for transpiled documents, keyed by source identity
/// (a file path or document URI).
pub trait TranspileCache: Send + Sync + Debug {
    /// Returns the value stored under `key`, running `compute` and storing its
    /// result on a miss. Failed computations are not stored.
    fn get(
        &self,
        key: &str,
        compute: &mut dyn FnMut() -> Result<String, TranspileError>,
    ) -> Result<String, TranspileError>;
}

/// A process-lifetime cache held in memory.
///
/// `compute` runs outside the lock; when two threads miss the same key at
/// once, the value stored first is kept and returned to both.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl TranspileCache for MemoryCache {
    fn get(
        &self,
        key: &str,
        compute: &mut dyn FnMut() -> Result<String, TranspileError>,
    ) -> Result<String, TranspileError> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| TranspileError::Cache("Failed to acquire cache lock".to_string()))?;
            if let Some(cached) = entries.get(key) {
                log::debug!("Cache hit for '{}'", key);
                return Ok(cached.clone());
            }
        }

        log::debug!("Cache miss for '{}'", key);
        let value = compute()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| TranspileError::Cache("Failed to acquire cache lock".to_string()))?;
        Ok(entries.entry(key.to_string()).or_insert(value).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once_per_key() {
        let cache = MemoryCache::new();
        let mut calls = 0;
        let mut compute = || {
            calls += 1;
            Ok::<_, TranspileError>(format!("result-{}", calls))
        };

        assert_eq!(cache.get("a.xsl", &mut compute).unwrap(), "result-1");
        assert_eq!(cache.get("a.xsl", &mut compute).unwrap(), "result-1");
        assert_eq!(cache.get("b.xsl", &mut compute).unwrap(), "result-2");
        assert_eq!(calls, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = MemoryCache::new();
        let failed = cache.get("a.xsl", &mut || {
            Err(TranspileError::InvalidDocument("broken".to_string()))
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());

        assert_eq!(
            cache.get("a.xsl", &mut || Ok("ok".to_string())).unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_clear() {
        let cache = MemoryCache::new();
        cache.get("k", &mut || Ok("v".to_string())).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
