//! Read helpers that decode stored edges.

use edgekv_core::encoding::keys;
use edgekv_core::{CoreError, EdgeKey, EdgeRecord, EdgeType, PartitionId, VertexId};
use edgekv_storage::{KeyValue, OrderedKvStore, StorageError, StorageResult};
use thiserror::Error;

/// Errors that can occur while reading edges back.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A key in an edge range did not decode as an edge key.
    #[error("corrupt edge key in partition {partition}: {source}")]
    CorruptKey {
        /// Where the key was found.
        partition: PartitionId,
        /// Why it did not decode.
        #[source]
        source: CoreError,
    },

    /// The store failed the scan.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Stateless helpers over any [`OrderedKvStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeReader;

impl EdgeReader {
    /// Every stored version of `edge`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] if the scan fails or yields a corrupt key.
    pub fn versions<S: OrderedKvStore>(store: &S, edge: &EdgeKey) -> Result<Vec<EdgeRecord>, ReadError> {
        let (start, end) = edge.version_range();
        let scan = store.range(edge.partition, &start, &end)?;
        decode_all(edge.partition, scan)
    }

    /// The newest stored version of `edge`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] if the scan fails or yields a corrupt key.
    pub fn latest<S: OrderedKvStore>(store: &S, edge: &EdgeKey) -> Result<Option<EdgeRecord>, ReadError> {
        let (start, end) = edge.version_range();
        let mut scan = store.range(edge.partition, &start, &end)?;
        scan.next().map(|entry| decode(edge.partition, entry)).transpose()
    }

    /// Every stored record of type `edge_type` leaving `source`, grouped by
    /// logical edge with each group newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] if the scan fails or yields a corrupt key.
    pub fn edges<S: OrderedKvStore>(
        store: &S,
        partition: PartitionId,
        source: VertexId,
        edge_type: EdgeType,
    ) -> Result<Vec<EdgeRecord>, ReadError> {
        let prefix = keys::edge_prefix(partition, source, edge_type);
        decode_all(partition, store.prefix(partition, &prefix)?)
    }
}

fn decode(partition: PartitionId, entry: StorageResult<KeyValue>) -> Result<EdgeRecord, ReadError> {
    let (key, value) = entry?;
    EdgeRecord::from_entry(&key, value).map_err(|source| ReadError::CorruptKey { partition, source })
}

fn decode_all<I>(partition: PartitionId, scan: I) -> Result<Vec<EdgeRecord>, ReadError>
where
    I: Iterator<Item = StorageResult<KeyValue>>,
{
    scan.map(|entry| decode(partition, entry)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use edgekv_core::{Ranking, Version};
    use edgekv_storage::backends::MemoryStore;

    use super::*;

    const PART: PartitionId = PartitionId::new(0);

    fn edge(dst: i64) -> EdgeKey {
        EdgeKey::new(PART, VertexId::new(1), EdgeType::new(5), Ranking::new(0), VertexId::new(dst))
    }

    fn put(store: &MemoryStore, edge: EdgeKey, version: u64) {
        store.put(PART, &edge.with_version(Version::new(version)).encode(), &version.to_be_bytes()).unwrap();
    }

    #[test]
    fn versions_newest_first() {
        let store = MemoryStore::new();
        for v in [3, 9, 4] {
            put(&store, edge(2), v);
        }
        put(&store, edge(3), 100);

        let versions: Vec<u64> =
            EdgeReader::versions(&store, &edge(2)).unwrap().iter().map(|r| r.key.version.as_u64()).collect();
        assert_eq!(versions, vec![9, 4, 3]);

        let latest = EdgeReader::latest(&store, &edge(2)).unwrap().unwrap();
        assert_eq!(latest.key.version, Version::new(9));
        assert_eq!(latest.key.edge, edge(2));
    }

    #[test]
    fn latest_of_missing_edge() {
        let store = MemoryStore::new();
        assert!(EdgeReader::latest(&store, &edge(2)).unwrap().is_none());
        assert!(EdgeReader::versions(&store, &edge(2)).unwrap().is_empty());
    }

    #[test]
    fn edges_groups_by_destination() {
        let store = MemoryStore::new();
        put(&store, edge(3), 1);
        put(&store, edge(2), 7);
        put(&store, edge(2), 8);

        let found: Vec<(i64, u64)> = EdgeReader::edges(&store, PART, VertexId::new(1), EdgeType::new(5))
            .unwrap()
            .iter()
            .map(|r| (r.key.edge.destination.as_i64(), r.key.version.as_u64()))
            .collect();
        assert_eq!(found, vec![(2, 8), (2, 7), (3, 1)]);
    }

    #[test]
    fn corrupt_key_is_reported() {
        let store = MemoryStore::new();
        let mut prefix = keys::edge_prefix(PART, VertexId::new(1), EdgeType::new(5));
        prefix.push(0xAA);
        store.put(PART, &prefix, b"junk").unwrap();

        let err = EdgeReader::edges(&store, PART, VertexId::new(1), EdgeType::new(5)).unwrap_err();
        assert!(matches!(err, ReadError::CorruptKey { partition, .. } if partition == PART));
    }
}
