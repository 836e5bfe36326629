//! Redb storage backend.
//!
//! This module provides an [`OrderedKvStore`](crate::OrderedKvStore) backed by
//! Redb, a pure-Rust embedded database with ACID transactions.
//!
//! # Layout
//!
//! All partitions share one physical table. Each physical key is the
//! big-endian partition id followed by the logical key, so byte order within a
//! partition is the logical key order.
//!
//! # Example
//!
//! ```ignore
//! use edgekv_storage::backends::RedbStore;
//! use edgekv_storage::OrderedKvStore;
//!
//! let store = RedbStore::open("edges.redb")?;
//! store.put(PartitionId::new(0), b"key", b"value")?;
//! assert_eq!(store.get(PartitionId::new(0), b"key")?, Some(b"value".to_vec()));
//! ```
//!
//! # In-Memory Databases
//!
//! For testing, you can create an in-memory database that doesn't persist:
//!
//! ```ignore
//! let store = RedbStore::in_memory()?;
//! ```

mod engine;
mod scan;
pub mod tables;

pub use engine::{RedbConfig, RedbStore};
pub use scan::RedbScan;
