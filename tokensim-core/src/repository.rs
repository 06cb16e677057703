//! Whole-collection table access on top of the key-value store.

use crate::bus::{ChangeBus, ChangeEvent, ChangeKind};
use crate::store::{Kvs, StoreError};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// The logical keys of persisted state. One JSON blob per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Single current session object, owned by the session manager. Not a
    /// collection; listed here so change events can name it.
    Session,
    Profiles,
    Roles,
    Investments,
    Orders,
    Transactions,
}

impl Table {
    pub fn key(self) -> &'static str {
        match self {
            Table::Session => "session",
            Table::Profiles => "user-profiles",
            Table::Roles => "user-roles",
            Table::Investments => "investments",
            Table::Orders => "orders",
            Table::Transactions => "transactions",
        }
    }
}

/// Typed collection access over the store.
///
/// Every mutation is a whole-collection replace: read, modify, write. There
/// is no row-level protocol, no cross-table atomicity, and no optimistic
/// concurrency check: two contexts interleaving read-modify-write on the
/// same table will silently lose the first writer's update. That clobber is
/// a faithful property of the simulated backend (see the cross_context
/// regression test), not an oversight.
///
/// A clone of a `Repository` shares the same storage and bus: it behaves as
/// the same origin opened in another execution context.
#[derive(Clone)]
pub struct Repository {
    kvs: Arc<dyn Kvs>,
    bus: ChangeBus,
}

impl Repository {
    pub fn new(kvs: Arc<dyn Kvs>, bus: ChangeBus) -> Self {
        Self { kvs, bus }
    }

    pub fn kvs(&self) -> &Arc<dyn Kvs> {
        &self.kvs
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Reads the whole collection. A missing or corrupt blob decodes to an
    /// empty vector; corruption must never take the caller down.
    pub fn read_all<T: DeserializeOwned>(&self, table: Table) -> Vec<T> {
        let Some(raw) = self.kvs.get(table.key()) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Repository: corrupt blob under '{}' treated as empty: {}",
                    table.key(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replaces the whole collection and announces the change.
    pub fn write_all<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(rows).map_err(|source| StoreError::Serialize {
            key: table.key().to_string(),
            source,
        })?;

        self.kvs.set(table.key(), &json)?;
        self.bus.publish(ChangeEvent {
            table,
            kind: ChangeKind::Updated,
        });
        Ok(())
    }

    /// Appends one row (read-modify-write of the whole collection).
    pub fn insert<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        row: T,
    ) -> Result<(), StoreError> {
        let mut rows = self.read_all::<T>(table);
        rows.push(row);
        self.write_all(table, &rows)
    }
}
