//! On-disk cache of raw query responses
//!
//! Responses are stored verbatim under `<dir>/<key>.cached`, where `key` is
//! the hex SHA-256 of the query serialized with sorted keys. Re-running an
//! identical query therefore never hits the network.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SourceError;

/// Directory-backed response cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a query: hex SHA-256 of its canonical form.
    ///
    /// Object keys are sorted so two queries that differ only in key order
    /// share an entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use bruit_harness::source::ResponseCache;
    /// use serde_json::json;
    ///
    /// let a = ResponseCache::key(&json!({"from": "perf", "limit": 1}));
    /// let b = ResponseCache::key(&json!({"limit": 1, "from": "perf"}));
    /// assert_eq!(a, b);
    /// assert_eq!(a.len(), 64);
    /// ```
    pub fn key(query: &Value) -> String {
        let canonical = canonicalize(query);
        // Serializing a Value cannot fail
        let text = serde_json::to_string_pretty(&canonical).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Path of the cache entry for `query`.
    pub fn path_for(&self, query: &Value) -> PathBuf {
        self.dir.join(format!("{}.cached", Self::key(query)))
    }

    /// Load a cached response, if present.
    pub fn get(&self, query: &Value) -> Result<Option<Value>, SourceError> {
        let path = self.path_for(query);
        if !path.exists() {
            return Ok(None);
        }
        debug!("Cache hit: {}", path.display());
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Store a raw response body, returning the entry path.
    pub fn put(&self, query: &Value, body: &str) -> Result<PathBuf, SourceError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(query);
        fs::write(&path, body)?;
        debug!("Cached response at {}", path.display());
        Ok(path)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
