//! Redb table definition and partition key prefixing.
//!
//! Redb requires static table names, so partitions are folded into a single
//! physical table by prefixing every key with its partition id.

use edgekv_core::PartitionId;
use redb::TableDefinition;

/// The physical table that stores all key-value pairs.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> = TableDefinition::new("edgekv_data");

/// Length of the partition prefix on every physical key.
pub const PARTITION_PREFIX_LEN: usize = 4;

/// Encode a partition and logical key into a physical key.
///
/// The format is: `<partition u32 big-endian><key>`
#[must_use]
pub fn encode_key(partition: PartitionId, key: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(PARTITION_PREFIX_LEN + key.len());
    encoded.extend_from_slice(&partition.as_u32().to_be_bytes());
    encoded.extend_from_slice(key);
    encoded
}

/// Decode a physical key into its partition and logical key.
///
/// Returns `None` if the key is shorter than the partition prefix.
#[must_use]
pub fn decode_key(encoded: &[u8]) -> Option<(PartitionId, &[u8])> {
    let prefix: [u8; PARTITION_PREFIX_LEN] = encoded.get(..PARTITION_PREFIX_LEN)?.try_into().ok()?;
    Some((PartitionId::new(u32::from_be_bytes(prefix)), &encoded[PARTITION_PREFIX_LEN..]))
}

/// The first physical key that does not belong to `partition`.
///
/// Returns `None` for the last partition id, whose keys run to the end of the table.
#[must_use]
pub fn partition_end_key(partition: PartitionId) -> Option<Vec<u8>> {
    partition.as_u32().checked_add(1).map(|next| next.to_be_bytes().to_vec())
}
