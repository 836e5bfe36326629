//! `EdgeKV` Storage
//!
//! This crate defines the ordered key-value contract the edge write path
//! relies on, and the backends that implement it.
//!
//! # Overview
//!
//! Keys are stored per partition and iterated in ascending byte order. The
//! edge key layout in `edgekv-core` is designed so that this single ordering
//! groups records by logical edge and visits versions newest first.
//!
//! # Core Traits
//!
//! - [`OrderedKvStore`] - point writes, point reads, prefix and range scans
//!
//! # Error Handling
//!
//! All storage operations return [`StorageResult<T>`], which is an alias for
//! `Result<T, StorageError>`.
//!
//! # Example
//!
//! ```
//! use edgekv_core::PartitionId;
//! use edgekv_storage::backends::MemoryStore;
//! use edgekv_storage::OrderedKvStore;
//!
//! let store = MemoryStore::new();
//! let part = PartitionId::new(0);
//!
//! store.put(part, b"b", b"2").unwrap();
//! store.put(part, b"a", b"1").unwrap();
//!
//! let keys: Vec<_> = store
//!     .prefix(part, b"")
//!     .unwrap()
//!     .map(|entry| entry.unwrap().0)
//!     .collect();
//! assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Store trait and error types
//! - [`backends`] - In-memory and Redb implementations

#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{prefix_successor, KeyValue, OrderedKvStore, StorageError, StorageResult};
