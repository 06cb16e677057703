use super::kvs::{Kvs, StoreError, DEFAULT_QUOTA_BYTES};
use log::warn;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// File-backed store: one file per key under a data directory.
///
/// Writes go through a temp file, fsync, and rename so a crash mid-write can
/// never corrupt a previously stored value. Byte usage is recovered by
/// scanning the directory on open.
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    quota: usize,
    sizes: Mutex<HashMap<String, usize>>,
}

impl DiskStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_quota(dir, DEFAULT_QUOTA_BYTES)
    }

    pub fn open_with_quota(dir: impl Into<PathBuf>, quota: usize) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut sizes = HashMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || name.ends_with(".tmp") {
                continue;
            }
            let len = entry.metadata()?.len() as usize;
            sizes.insert(name.to_string(), name.len() + len);
        }

        Ok(Self {
            dir,
            quota,
            sizes: Mutex::new(sizes),
        })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    // A poisoned lock still holds a valid size map; recover it.
    fn sizes(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.sizes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        // Keys are flat logical names; anything path-like would escape the
        // data directory.
        if key.is_empty()
            || key.starts_with('.')
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid storage key '{key}'"),
            )));
        }
        Ok(self.dir.join(key))
    }
}

impl Kvs for DiskStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        std::fs::read_to_string(path).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let mut sizes = self.sizes();

        let current: usize = sizes.values().sum();
        let replaced = sizes.get(key).copied().unwrap_or(0);
        let attempted = key.len() + value.len();

        if current - replaced + attempted > self.quota {
            return Err(StoreError::CapacityExceeded {
                key: key.to_string(),
                attempted,
                quota: self.quota,
            });
        }

        let temp_path = path.with_extension("tmp");
        let mut temp_file = std::fs::File::create(&temp_path)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.sync_all()?;
        std::fs::rename(&temp_path, &path)?;

        sizes.insert(key.to_string(), attempted);
        Ok(())
    }

    fn remove(&self, key: &str) {
        let Ok(path) = self.path_for(key) else {
            return;
        };
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("DiskStore: failed to remove '{}': {}", key, e);
                return;
            }
        }
        self.sizes().remove(key);
    }

    fn used_bytes(&self) -> usize {
        self.sizes().values().sum()
    }

    fn quota_bytes(&self) -> usize {
        self.quota
    }
}
