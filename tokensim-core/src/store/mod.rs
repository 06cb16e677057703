//! Durable key-value storage primitives.
//!
//! The store is the only shared resource between execution contexts. It is
//! deliberately primitive: string keys to string values, a byte quota, no
//! TTL, no encryption. Durability is "until the user clears the data
//! directory".

pub mod disk;
pub mod kvs;
pub mod memory;

pub use disk::DiskStore;
pub use kvs::{Kvs, StoreError, DEFAULT_QUOTA_BYTES};
pub use memory::MemoryStore;
