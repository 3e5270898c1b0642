//! In-memory mocks
//!
//! [`MemorySessionStore`] stands in for browser-style local storage.
//! [`CallLog`] records named calls from several mocks into one ordered list.

// Test mocks; failures are expressed through return types.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Key/value session storage kept in memory.
///
/// ```
/// use gangway_common::testing::MemorySessionStore;
///
/// let store = MemorySessionStore::new();
/// store.set("access_token", "abc");
/// assert_eq!(store.get("access_token"), Some("abc".to_string()));
///
/// store.clear();
/// assert!(store.is_empty());
/// assert_eq!(store.clear_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    clears: Arc<Mutex<usize>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with entries.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (k, v) in entries {
            store.data.lock().insert(k.into(), v.into());
        }
        store
    }

    pub fn set(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.data.lock().remove(key)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.data.lock().clear();
        *self.clears.lock() += 1;
    }

    /// How many times [`clear`](Self::clear) ran.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        *self.clears.lock()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

/// Ordered record of calls shared between mocks.
///
/// ```
/// use gangway_common::testing::CallLog;
///
/// let log = CallLog::new();
/// log.record("configure");
/// log.record("load_discovery_document");
/// assert!(log.happened_before("configure", "load_discovery_document"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    #[must_use]
    pub fn contains(&self, call: &str) -> bool {
        self.count(call) > 0
    }

    /// First occurrence of `first` precedes first occurrence of `second`.
    #[must_use]
    pub fn happened_before(&self, first: &str, second: &str) -> bool {
        let calls = self.calls.lock();
        let a = calls.iter().position(|c| c == first);
        let b = calls.iter().position(|c| c == second);
        matches!((a, b), (Some(a), Some(b)) if a < b)
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}
