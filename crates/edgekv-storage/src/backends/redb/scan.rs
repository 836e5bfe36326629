//! Batched scans over a Redb read transaction.

use std::collections::VecDeque;
use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable};

use crate::engine::{KeyValue, StorageError, StorageResult};

use super::tables::{decode_key, DATA_TABLE};

/// A lazy scan over one partition of a [`RedbStore`](super::RedbStore).
///
/// The scan owns its read transaction, so every batch sees the same snapshot.
/// Entries are loaded `batch_size` at a time; each batch resumes strictly
/// after the last physical key of the previous one.
pub struct RedbScan {
    tx: Option<ReadTransaction>,
    next_start: Bound<Vec<u8>>,
    end: Option<Vec<u8>>,
    batch: VecDeque<KeyValue>,
    batch_size: usize,
    exhausted: bool,
}

impl RedbScan {
    pub(super) fn new(
        tx: ReadTransaction,
        start: Vec<u8>,
        end: Option<Vec<u8>>,
        batch_size: usize,
    ) -> Self {
        Self {
            tx: Some(tx),
            next_start: Bound::Included(start),
            end,
            batch: VecDeque::new(),
            batch_size: batch_size.max(1),
            exhausted: false,
        }
    }

    pub(super) fn empty() -> Self {
        Self {
            tx: None,
            next_start: Bound::Unbounded,
            end: None,
            batch: VecDeque::new(),
            batch_size: 1,
            exhausted: true,
        }
    }

    fn fetch_batch(&mut self) -> StorageResult<()> {
        let Some(tx) = &self.tx else {
            self.exhausted = true;
            return Ok(());
        };

        let start = as_slice_bound(&self.next_start);
        let fetched = read_batch(tx, start, self.end.as_deref(), self.batch_size)?;

        if fetched.len() < self.batch_size {
            self.exhausted = true;
        }
        if let Some((last, _)) = fetched.last() {
            self.next_start = Bound::Excluded(last.clone());
        } else {
            self.exhausted = true;
        }

        for (physical, value) in fetched {
            // Every key in the table carries a partition prefix
            if let Some((_, key)) = decode_key(&physical) {
                self.batch.push_back((key.to_vec(), value));
            }
        }
        Ok(())
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Read up to `limit` physical entries from `start` up to the exclusive `end`.
fn read_batch(
    tx: &ReadTransaction,
    start: Bound<&[u8]>,
    end: Option<&[u8]>,
    limit: usize,
) -> StorageResult<Vec<KeyValue>> {
    let table = match tx.open_table(DATA_TABLE) {
        Ok(t) => t,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::Internal(e.to_string())),
    };

    let end = end.map_or(Bound::Unbounded, Bound::Excluded);
    let range = table.range::<&[u8]>((start, end)).map_err(|e| StorageError::Internal(e.to_string()))?;

    let mut entries = Vec::with_capacity(limit);
    for item in range.take(limit) {
        let (key, value) = item.map_err(|e| StorageError::Internal(e.to_string()))?;
        entries.push((key.value().to_vec(), value.value().to_vec()));
    }
    Ok(entries)
}

impl Iterator for RedbScan {
    type Item = StorageResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_batch() {
                // Report the failure once, then stop
                self.exhausted = true;
                self.batch.clear();
                return Some(Err(e));
            }
        }
        self.batch.pop_front().map(Ok)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use edgekv_core::PartitionId;

    use crate::backends::redb::{RedbConfig, RedbStore};
    use crate::engine::OrderedKvStore;

    #[test]
    fn scan_crosses_batch_boundaries() {
        let store = RedbStore::in_memory_with_config(RedbConfig::new().scan_batch_size(3)).unwrap();
        let part = PartitionId::new(5);
        for i in 0u8..10 {
            store.put(part, &[i], &[i]).unwrap();
        }

        let keys: Vec<u8> = store.prefix(part, &[]).unwrap().map(|e| e.unwrap().0[0]).collect();
        assert_eq!(keys, (0u8..10).collect::<Vec<_>>());
    }

    #[test]
    fn scan_exact_multiple_of_batch_size() {
        let store = RedbStore::in_memory_with_config(RedbConfig::new().scan_batch_size(2)).unwrap();
        let part = PartitionId::new(0);
        for i in 0u8..4 {
            store.put(part, &[i], b"").unwrap();
        }
        assert_eq!(store.range(part, &[0], &[4]).unwrap().count(), 4);
        assert_eq!(store.range(part, &[1], &[3]).unwrap().count(), 2);
    }

    #[test]
    fn scan_sees_snapshot() {
        let store = RedbStore::in_memory_with_config(RedbConfig::new().scan_batch_size(1)).unwrap();
        let part = PartitionId::new(0);
        store.put(part, b"a", b"1").unwrap();
        store.put(part, b"b", b"2").unwrap();

        let mut scan = store.prefix(part, b"").unwrap();
        assert_eq!(scan.next().unwrap().unwrap().0, b"a".to_vec());
        store.put(part, b"ab", b"late").unwrap();
        let rest: Vec<_> = scan.map(|e| e.unwrap().0).collect();
        assert_eq!(rest, vec![b"b".to_vec()]);
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = RedbStore::in_memory().unwrap();
        let part = PartitionId::new(0);
        store.put(part, b"m", b"").unwrap();
        assert_eq!(store.range(part, b"z", b"a").unwrap().count(), 0);
    }
}
