//! Edge keys and records.
//!
//! An [`EdgeKey`] names a logical edge inside one partition. A
//! [`VersionedKey`] adds the version and is what the store actually holds.
//!
//! # Example
//!
//! ```
//! use edgekv_core::types::{EdgeKey, EdgeType, PartitionId, Ranking, Version, VertexId};
//!
//! let key = EdgeKey::new(
//!     PartitionId::new(1),
//!     VertexId::new(10),
//!     EdgeType::new(3),
//!     Ranking::new(0),
//!     VertexId::new(20),
//! );
//!
//! let stored = key.with_version(Version::new(5));
//! let bytes = stored.encode();
//! assert!(bytes.starts_with(&key.prefix()));
//! ```

use serde::{Deserialize, Serialize};

use super::{EdgeType, PartitionId, Ranking, Version, VertexId};
use crate::encoding::keys;
use crate::error::CoreError;

/// Logical identity of an edge, irrespective of version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    /// The partition the edge lives in.
    pub partition: PartitionId,
    /// The source vertex.
    pub source: VertexId,
    /// The schema-defined edge type.
    pub edge_type: EdgeType,
    /// Ranking among parallel edges.
    pub ranking: Ranking,
    /// The destination vertex.
    pub destination: VertexId,
}

impl EdgeKey {
    /// Create a new edge key.
    #[must_use]
    pub const fn new(
        partition: PartitionId,
        source: VertexId,
        edge_type: EdgeType,
        ranking: Ranking,
        destination: VertexId,
    ) -> Self {
        Self { partition, source, edge_type, ranking, destination }
    }

    /// Attach a version, producing the physical key identity.
    #[inline]
    #[must_use]
    pub const fn with_version(self, version: Version) -> VersionedKey {
        VersionedKey { edge: self, version }
    }

    /// The encoded key prefix shared by every version of this edge.
    #[must_use]
    pub fn prefix(&self) -> Vec<u8> {
        keys::logical_edge_prefix(
            self.partition,
            self.source,
            self.edge_type,
            self.ranking,
            self.destination,
        )
    }

    /// The half-open `[start, end)` key range holding every version of this
    /// edge, newest first.
    #[must_use]
    pub fn version_range(&self) -> (Vec<u8>, Vec<u8>) {
        keys::logical_edge_range(
            self.partition,
            self.source,
            self.edge_type,
            self.ranking,
            self.destination,
        )
    }
}

/// Physical identity of a stored edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedKey {
    /// The logical edge.
    pub edge: EdgeKey,
    /// The version of this record.
    pub version: Version,
}

impl VersionedKey {
    /// Encode into the order-preserving byte layout.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        keys::encode_edge_key(
            self.edge.partition,
            self.edge.source,
            self.edge.edge_type,
            self.edge.ranking,
            self.edge.destination,
            self.version,
        )
    }

    /// Decode from the byte layout produced by [`VersionedKey::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if the bytes are not an edge key.
    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        keys::decode_edge_key(bytes)
            .ok_or_else(|| CoreError::malformed_key(keys::EDGE_KEY_LEN, bytes))
    }
}

/// A stored edge: its versioned key plus the opaque value bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Where the record is stored.
    pub key: VersionedKey,
    /// The value written for this version.
    pub value: Vec<u8>,
}

impl EdgeRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(key: VersionedKey, value: impl Into<Vec<u8>>) -> Self {
        Self { key, value: value.into() }
    }

    /// Decode a record from a raw key-value pair read back from a store.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if the key is not an edge key.
    pub fn from_entry(key: &[u8], value: Vec<u8>) -> Result<Self, CoreError> {
        Ok(Self { key: VersionedKey::decode(key)?, value })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_key() -> EdgeKey {
        EdgeKey::new(
            PartitionId::new(0),
            VertexId::new(101),
            EdgeType::new(10101),
            Ranking::new(10102),
            VertexId::new(10103),
        )
    }

    #[test]
    fn versioned_key_roundtrip() {
        let key = sample_key().with_version(Version::new(1_700_000_000_000_000));
        let decoded = VersionedKey::decode(&key.encode()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn encoded_key_starts_with_prefix() {
        let key = sample_key();
        let encoded = key.with_version(Version::SINGLE_SLOT).encode();
        assert!(encoded.starts_with(&key.prefix()));
    }

    #[test]
    fn version_range_contains_storable_versions() {
        let key = sample_key();
        let (start, end) = key.version_range();
        for version in [Version::SINGLE_SLOT, Version::new(2), Version::MAX] {
            let encoded = key.with_version(version).encode();
            assert!(encoded.as_slice() >= start.as_slice());
            assert!(encoded.as_slice() < end.as_slice());
        }
        let sentinel = key.with_version(Version::ZERO).encode();
        assert!(sentinel.as_slice() >= end.as_slice());
    }

    #[test]
    fn record_from_entry_rejects_foreign_key() {
        assert!(EdgeRecord::from_entry(b"not an edge key", Vec::new()).is_err());
    }

    #[test]
    fn record_from_entry_decodes_key() {
        let key = sample_key().with_version(Version::new(3));
        let record = EdgeRecord::from_entry(&key.encode(), b"v3".to_vec()).unwrap();
        assert_eq!(record, EdgeRecord::new(key, b"v3".to_vec()));
    }
}
