//! Storage engine traits and abstractions.
//!
//! - [`OrderedKvStore`] - Partitioned, ordered key-value operations
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`]. See [`StorageError`] for the
//! possible error variants.

mod error;
mod traits;

pub use error::{StorageError, StorageResult};
pub use traits::{prefix_successor, KeyValue, OrderedKvStore};
