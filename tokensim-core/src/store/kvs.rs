use thiserror::Error;

/// Default byte quota, sized like a browser origin's localStorage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was dropped; the previously stored value is intact.
    #[error(
        "capacity exceeded writing '{key}': {attempted} bytes would push usage past the {quota} byte quota"
    )]
    CapacityExceeded {
        key: String,
        attempted: usize,
        quota: usize,
    },

    #[error("failed to encode '{key}' for storage")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend failure")]
    Io(#[from] std::io::Error),
}

/// The durable key-value storage contract.
///
/// Implementors must guarantee that a failed `set` leaves the prior value
/// untouched (degraded, never corrupted). None of the operations may panic
/// past the caller.
pub trait Kvs: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written (or
    /// the backend cannot produce it).
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any prior value.
    ///
    /// Fails with [`StoreError::CapacityExceeded`] when the write would push
    /// total usage past the quota; the prior value is preserved.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the key. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Bytes currently accounted against the quota.
    fn used_bytes(&self) -> usize;

    fn quota_bytes(&self) -> usize;
}
