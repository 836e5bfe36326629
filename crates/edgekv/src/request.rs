//! Request and response types for batched edge writes.

use std::collections::BTreeMap;

use edgekv_core::{EdgeKey, EdgeType, PartitionId, Ranking, SpaceId, VertexId};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, WriteError};

/// The caller-supplied identity of an edge: everything but the partition
/// (given by the batch) and the version (assigned on write).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeWriteKey {
    /// The source vertex.
    pub source: VertexId,
    /// The edge type.
    pub edge_type: EdgeType,
    /// Ranking among parallel edges.
    pub ranking: Ranking,
    /// The destination vertex.
    pub destination: VertexId,
}

impl EdgeWriteKey {
    /// Create a new write key.
    #[must_use]
    pub const fn new(
        source: VertexId,
        edge_type: EdgeType,
        ranking: Ranking,
        destination: VertexId,
    ) -> Self {
        Self { source, edge_type, ranking, destination }
    }

    /// The logical edge this key names inside `partition`.
    #[inline]
    #[must_use]
    pub const fn in_partition(self, partition: PartitionId) -> EdgeKey {
        EdgeKey::new(partition, self.source, self.edge_type, self.ranking, self.destination)
    }
}

/// One edge to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEdge {
    /// Which edge.
    pub key: EdgeWriteKey,
    /// Opaque value bytes.
    pub value: Vec<u8>,
}

impl NewEdge {
    /// Create a new edge.
    #[must_use]
    pub fn new(key: EdgeWriteKey, value: impl Into<Vec<u8>>) -> Self {
        Self { key, value: value.into() }
    }
}

/// A batch of edges for one space, grouped by partition.
///
/// Edges within a partition are applied in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddEdgesRequest {
    /// The space whose schema governs the edges.
    pub space_id: SpaceId,
    /// Caller's overwrite intent. Accepted and logged; single-slot edge types
    /// overwrite regardless.
    pub overwritable: bool,
    /// Edges to write, per partition.
    pub parts: BTreeMap<PartitionId, Vec<NewEdge>>,
}

impl AddEdgesRequest {
    /// Create an empty request for `space_id` with `overwritable` set.
    #[must_use]
    pub fn new(space_id: SpaceId) -> Self {
        Self { space_id, overwritable: true, parts: BTreeMap::new() }
    }

    /// Set the overwrite flag.
    #[must_use]
    pub fn overwritable(mut self, overwritable: bool) -> Self {
        self.overwritable = overwritable;
        self
    }

    /// Append an edge to `partition`.
    pub fn add_edge(&mut self, partition: PartitionId, edge: NewEdge) {
        self.parts.entry(partition).or_default().push(edge);
    }

    /// Builder form of [`AddEdgesRequest::add_edge`].
    #[must_use]
    pub fn with_edge(mut self, partition: PartitionId, edge: NewEdge) -> Self {
        self.add_edge(partition, edge);
        self
    }

    /// Total number of edges across all partitions.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.parts.values().map(Vec::len).sum()
    }
}

/// A partition that did not fully succeed, with the first error it hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionFailure {
    /// The failed partition.
    pub partition: PartitionId,
    /// Why it failed.
    pub code: ErrorCode,
}

/// The outcome of a batch. No failures means every edge was written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddEdgesResponse {
    failures: Vec<PartitionFailure>,
}

impl AddEdgesResponse {
    /// Build a response from per-partition failure codes.
    #[must_use]
    pub fn from_failures(failures: BTreeMap<PartitionId, ErrorCode>) -> Self {
        Self {
            failures: failures
                .into_iter()
                .map(|(partition, code)| PartitionFailure { partition, code })
                .collect(),
        }
    }

    /// Failed partitions. Responses built by the processor list them in
    /// ascending partition order.
    #[must_use]
    pub fn failures(&self) -> &[PartitionFailure] {
        &self.failures
    }

    /// Whether every partition succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure code for `partition`, if it failed.
    #[must_use]
    pub fn code_for(&self, partition: PartitionId) -> Option<ErrorCode> {
        self.failures.iter().find(|f| f.partition == partition).map(|f| f.code)
    }

    /// Convert into a `Result`, failing if any partition failed.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::PartialBatchFailure`] listing the failed partitions.
    pub fn into_result(self) -> Result<(), WriteError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(WriteError::PartialBatchFailure { failures: self.failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i64) -> EdgeWriteKey {
        EdgeWriteKey::new(VertexId::new(n), EdgeType::new(1), Ranking::new(0), VertexId::new(n + 1))
    }

    #[test]
    fn request_builder_groups_by_partition() {
        let request = AddEdgesRequest::new(SpaceId::new(1))
            .overwritable(false)
            .with_edge(PartitionId::new(2), NewEdge::new(key(1), "a"))
            .with_edge(PartitionId::new(0), NewEdge::new(key(2), "b"))
            .with_edge(PartitionId::new(2), NewEdge::new(key(3), "c"));

        assert!(!request.overwritable);
        assert_eq!(request.edge_count(), 3);
        assert_eq!(request.parts.len(), 2);
        let values: Vec<_> = request.parts[&PartitionId::new(2)].iter().map(|e| e.value.clone()).collect();
        assert_eq!(values, vec![b"a".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn write_key_in_partition() {
        let edge = key(5).in_partition(PartitionId::new(9));
        assert_eq!(edge.partition, PartitionId::new(9));
        assert_eq!(edge.source, VertexId::new(5));
        assert_eq!(edge.destination, VertexId::new(6));
    }

    #[test]
    fn response_lookup_and_result() {
        let mut failures = BTreeMap::new();
        failures.insert(PartitionId::new(7), ErrorCode::StoreFailure);
        failures.insert(PartitionId::new(3), ErrorCode::SchemaNotFound);
        let response = AddEdgesResponse::from_failures(failures);

        assert!(!response.is_success());
        assert_eq!(response.failures()[0].partition, PartitionId::new(3));
        assert_eq!(response.code_for(PartitionId::new(7)), Some(ErrorCode::StoreFailure));
        assert_eq!(response.code_for(PartitionId::new(4)), None);

        match response.into_result() {
            Err(WriteError::PartialBatchFailure { failures }) => assert_eq!(failures.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(AddEdgesResponse::default().into_result().is_ok());
    }

    #[test]
    fn lookup_does_not_assume_sorted_failures() {
        let response = AddEdgesResponse {
            failures: vec![
                PartitionFailure { partition: PartitionId::new(9), code: ErrorCode::Internal },
                PartitionFailure { partition: PartitionId::new(2), code: ErrorCode::ShuttingDown },
                PartitionFailure { partition: PartitionId::new(5), code: ErrorCode::InvalidKey },
            ],
        };

        assert_eq!(response.code_for(PartitionId::new(9)), Some(ErrorCode::Internal));
        assert_eq!(response.code_for(PartitionId::new(2)), Some(ErrorCode::ShuttingDown));
        assert_eq!(response.code_for(PartitionId::new(5)), Some(ErrorCode::InvalidKey));
        assert_eq!(response.code_for(PartitionId::new(3)), None);
    }
}
