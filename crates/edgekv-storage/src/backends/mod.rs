//! Storage backend implementations.
//!
//! # Available Backends
//!
//! - [`memory`] - `BTreeMap`-backed store for tests and embedding, with write
//!   failure injection
//! - [`redb`] - Pure-Rust embedded database with ACID transactions

pub mod memory;
pub mod redb;

pub use self::memory::{MemoryScan, MemoryStore};
pub use self::redb::{RedbConfig, RedbScan, RedbStore};
