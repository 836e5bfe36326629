//! In-memory ordered store.
//!
//! Each partition is a `BTreeMap`, which already iterates in ascending byte
//! order. Scans copy the matching entries while holding the read lock, so a
//! scan is a point-in-time snapshot and never observes a half-applied write.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::{PoisonError, RwLock};

use edgekv_core::PartitionId;

use crate::engine::{prefix_successor, KeyValue, OrderedKvStore, StorageError, StorageResult};

type Partition = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory [`OrderedKvStore`].
///
/// Partitions are created on first write. Reading from a partition that was
/// never written returns nothing rather than an error.
///
/// Writes to a partition can be made to fail with [`MemoryStore::fail_writes`]
/// to exercise failure isolation between partitions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: RwLock<HashMap<PartitionId, Partition>>,
    failing: RwLock<HashSet<PartitionId>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `partition` fail with
    /// [`StorageError::WriteRejected`].
    pub fn fail_writes(&self, partition: PartitionId) {
        self.failing.write().unwrap_or_else(PoisonError::into_inner).insert(partition);
    }

    /// Undo [`MemoryStore::fail_writes`] for `partition`.
    pub fn heal(&self, partition: PartitionId) {
        self.failing.write().unwrap_or_else(PoisonError::into_inner).remove(&partition);
    }

    /// Number of keys stored in `partition`.
    #[must_use]
    pub fn len(&self, partition: PartitionId) -> usize {
        self.partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&partition)
            .map_or(0, BTreeMap::len)
    }

    /// Whether `partition` holds no keys.
    #[must_use]
    pub fn is_empty(&self, partition: PartitionId) -> bool {
        self.len(partition) == 0
    }

    fn check_writable(&self, partition: PartitionId) -> StorageResult<()> {
        let failing = self.failing.read().map_err(|e| StorageError::Internal(e.to_string()))?;
        if failing.contains(&partition) {
            return Err(StorageError::WriteRejected(partition));
        }
        Ok(())
    }

    fn snapshot(
        &self,
        partition: PartitionId,
        start: Bound<Vec<u8>>,
        end: Bound<Vec<u8>>,
    ) -> StorageResult<MemoryScan> {
        let partitions = self.partitions.read().map_err(|e| StorageError::Internal(e.to_string()))?;
        let entries = match partitions.get(&partition) {
            Some(data) => data.range((start, end)).map(|(k, v)| (k.clone(), v.clone())).collect(),
            None => Vec::new(),
        };
        Ok(MemoryScan { entries: entries.into_iter() })
    }
}

impl OrderedKvStore for MemoryStore {
    type Scan<'a> = MemoryScan;

    fn put(&self, partition: PartitionId, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.check_writable(partition)?;
        let mut partitions =
            self.partitions.write().map_err(|e| StorageError::Internal(e.to_string()))?;
        partitions.entry(partition).or_default().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn multi_put(&self, partition: PartitionId, entries: &[KeyValue]) -> StorageResult<()> {
        self.check_writable(partition)?;
        let mut partitions =
            self.partitions.write().map_err(|e| StorageError::Internal(e.to_string()))?;
        let data = partitions.entry(partition).or_default();
        for (key, value) in entries {
            data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn get(&self, partition: PartitionId, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let partitions = self.partitions.read().map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(partitions.get(&partition).and_then(|data| data.get(key).cloned()))
    }

    fn prefix(&self, partition: PartitionId, prefix: &[u8]) -> StorageResult<MemoryScan> {
        let end = prefix_successor(prefix).map_or(Bound::Unbounded, Bound::Excluded);
        self.snapshot(partition, Bound::Included(prefix.to_vec()), end)
    }

    fn range(&self, partition: PartitionId, start: &[u8], end: &[u8]) -> StorageResult<MemoryScan> {
        // BTreeMap::range panics on an inverted interval
        if start >= end {
            return Ok(MemoryScan::empty());
        }
        self.snapshot(partition, Bound::Included(start.to_vec()), Bound::Excluded(end.to_vec()))
    }
}

/// A snapshot scan over a [`MemoryStore`] partition.
#[derive(Debug)]
pub struct MemoryScan {
    entries: std::vec::IntoIter<KeyValue>,
}

impl MemoryScan {
    fn empty() -> Self {
        Self { entries: Vec::new().into_iter() }
    }
}

impl Iterator for MemoryScan {
    type Item = StorageResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}
