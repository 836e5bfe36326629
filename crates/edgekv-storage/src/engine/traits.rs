//! The ordered key-value store contract.
//!
//! The edge write path only needs four things from a storage engine: a
//! replacing point write, a point read, and two forward scans. Everything the
//! versioning scheme promises rests on the scans returning keys in ascending
//! byte order.

use std::sync::Arc;

use edgekv_core::PartitionId;

use super::StorageResult;

/// A key-value pair returned by scans.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// A partitioned store of byte keys kept in ascending byte order.
///
/// Implementations must be thread-safe (`Send + Sync`): partitions are
/// written from independent tasks.
///
/// # Scan Semantics
///
/// A scan reflects a snapshot taken no earlier than the moment it is opened.
/// It never observes a torn record, does not block writers, and is exhausted
/// after one forward pass. Calling [`OrderedKvStore::prefix`] or
/// [`OrderedKvStore::range`] again opens a fresh scan.
///
/// # Example
///
/// ```ignore
/// use edgekv_storage::OrderedKvStore;
///
/// fn count_versions<S: OrderedKvStore>(store: &S, part: PartitionId, prefix: &[u8]) -> usize {
///     store.prefix(part, prefix).map(|scan| scan.count()).unwrap_or(0)
/// }
/// ```
pub trait OrderedKvStore: Send + Sync {
    /// The scan iterator for this store.
    type Scan<'a>: Iterator<Item = StorageResult<KeyValue>>
    where
        Self: 'a;

    /// Put a key-value pair into a partition.
    ///
    /// If the key already exists its value is replaced; no separate delete is
    /// needed to overwrite.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or rejects the write.
    fn put(&self, partition: PartitionId, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Put several key-value pairs into a partition, applied in order.
    ///
    /// The default implementation issues one [`OrderedKvStore::put`] per entry
    /// and stops at the first failure. Backends with batched writes override it.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    fn multi_put(&self, partition: PartitionId, entries: &[KeyValue]) -> StorageResult<()> {
        for (key, value) in entries {
            self.put(partition, key, value)?;
        }
        Ok(())
    }

    /// Get the value stored under a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, partition: PartitionId, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Scan every key that starts with `prefix`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be opened.
    fn prefix(&self, partition: PartitionId, prefix: &[u8]) -> StorageResult<Self::Scan<'_>>;

    /// Scan keys in `[start, end)`, in ascending order.
    ///
    /// An empty or inverted interval yields nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be opened.
    fn range(
        &self,
        partition: PartitionId,
        start: &[u8],
        end: &[u8],
    ) -> StorageResult<Self::Scan<'_>>;
}

/// Compute the smallest key greater than every key that starts with `prefix`.
///
/// Returns `None` when no such key exists (the prefix is empty or all `0xFF`),
/// in which case a prefix scan runs to the end of the partition.
#[must_use]
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xFF {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Share one store between the processor and readers.
impl<S: OrderedKvStore> OrderedKvStore for Arc<S> {
    type Scan<'a>
        = S::Scan<'a>
    where
        Self: 'a;

    fn put(&self, partition: PartitionId, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).put(partition, key, value)
    }

    fn multi_put(&self, partition: PartitionId, entries: &[KeyValue]) -> StorageResult<()> {
        (**self).multi_put(partition, entries)
    }

    fn get(&self, partition: PartitionId, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(partition, key)
    }

    fn prefix(&self, partition: PartitionId, prefix: &[u8]) -> StorageResult<Self::Scan<'_>> {
        (**self).prefix(partition, prefix)
    }

    fn range(
        &self,
        partition: PartitionId,
        start: &[u8],
        end: &[u8],
    ) -> StorageResult<Self::Scan<'_>> {
        (**self).range(partition, start, end)
    }
}
