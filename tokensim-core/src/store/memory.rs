use super::kvs::{Kvs, StoreError, DEFAULT_QUOTA_BYTES};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-process quota-limited store.
///
/// Shared across simulated execution contexts via `Arc`, which makes it the
/// stand-in for same-origin storage in tests and demos.
#[derive(Debug)]
pub struct MemoryStore {
    quota: usize,
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A poisoned lock still holds valid entries; recover them.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn usage_of(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Kvs for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries();

        let current = Self::usage_of(&entries);
        let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let attempted = key.len() + value.len();

        if current - replaced + attempted > self.quota {
            return Err(StoreError::CapacityExceeded {
                key: key.to_string(),
                attempted,
                quota: self.quota,
            });
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    fn used_bytes(&self) -> usize {
        Self::usage_of(&self.entries())
    }

    fn quota_bytes(&self) -> usize {
        self.quota
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let store = MemoryStore::new();
        store.set("orders", "[]").unwrap();
        assert_eq!(store.get("orders").as_deref(), Some("[]"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn capacity_exceeded_preserves_prior_value() {
        let store = MemoryStore::with_quota(16);
        store.set("k", "short").unwrap();

        let err = store.set("k", "a value far past the quota").unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { .. }));
        assert_eq!(store.get("k").as_deref(), Some("short"));
    }

    #[test]
    fn replacing_a_value_frees_its_budget() {
        let store = MemoryStore::with_quota(12);
        store.set("k", "0123456789").unwrap();
        // 11 used of 12; a same-size replacement must not count twice.
        store.set("k", "abcdefghij").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("abcdefghij"));
    }

    #[test]
    fn remove_is_idempotent() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.remove("k");
        store.remove("k");
        assert_eq!(store.get("k"), None);
        assert_eq!(store.used_bytes(), 0);
    }
}
