//! Edge key layout.
//!
//! Every stored edge is keyed by:
//!
//! ```text
//! [0x02][partition u32][source i64][edge_type i32][ranking i64][destination i64][!version u64]
//! ```
//!
//! All integers are big-endian. Signed fields are stored with the sign bit
//! flipped so that negative values sort before positive ones. The version is
//! stored as its bitwise complement so that a larger (newer) version produces
//! a smaller byte pattern: an ascending scan visits the newest version first.
//!
//! Single-slot edge types write at a fixed version, so repeated writes land on
//! the same physical key. Versioned edge types use a fresh version per write.
//! Both go through the same encoder.

use crate::types::{EdgeKey, EdgeType, PartitionId, Ranking, Version, VersionedKey, VertexId};

/// Tag byte for edge keys.
pub const KEY_TAG_EDGE: u8 = 0x02;

/// Length of the vertex prefix: tag, partition, source.
pub const VERTEX_PREFIX_LEN: usize = 1 + 4 + 8;

/// Length of the edge prefix: vertex prefix plus edge type.
pub const EDGE_PREFIX_LEN: usize = VERTEX_PREFIX_LEN + 4;

/// Length of the logical edge prefix: edge prefix plus ranking and destination.
pub const LOGICAL_EDGE_PREFIX_LEN: usize = EDGE_PREFIX_LEN + 8 + 8;

/// Length of the encoded version suffix.
pub const VERSION_LEN: usize = 8;

/// Length of a full edge key.
pub const EDGE_KEY_LEN: usize = LOGICAL_EDGE_PREFIX_LEN + VERSION_LEN;

const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;
const SIGN_FLIP_I32: u32 = 0x8000_0000;

#[inline]
fn put_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&((value as u64) ^ SIGN_FLIP_I64).to_be_bytes());
}

#[inline]
fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&((value as u32) ^ SIGN_FLIP_I32).to_be_bytes());
}

#[inline]
fn read_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(offset..offset + 8)?.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(raw))
}

#[inline]
fn read_i64(bytes: &[u8], offset: usize) -> Option<i64> {
    read_u64(bytes, offset).map(|raw| (raw ^ SIGN_FLIP_I64) as i64)
}

#[inline]
fn read_i32(bytes: &[u8], offset: usize) -> Option<i32> {
    read_u32(bytes, offset).map(|raw| (raw ^ SIGN_FLIP_I32) as i32)
}

/// Encode a version into its 8-byte suffix.
///
/// The suffix is the bitwise complement of the version in big-endian order.
#[inline]
#[must_use]
pub const fn encode_version(version: Version) -> [u8; VERSION_LEN] {
    (!version.as_u64()).to_be_bytes()
}

/// Decode a version from its 8-byte suffix.
#[inline]
#[must_use]
pub const fn decode_version(bytes: [u8; VERSION_LEN]) -> Version {
    Version::new(!u64::from_be_bytes(bytes))
}

/// Encode a prefix covering every edge of a source vertex.
///
/// The key format is: `[KEY_TAG_EDGE][partition][source]`
#[must_use]
pub fn vertex_prefix(partition: PartitionId, source: VertexId) -> Vec<u8> {
    let mut key = Vec::with_capacity(EDGE_KEY_LEN);
    key.push(KEY_TAG_EDGE);
    key.extend_from_slice(&partition.as_u32().to_be_bytes());
    put_i64(&mut key, source.as_i64());
    key
}

/// Encode a prefix covering every edge of one type from a source vertex.
///
/// The key format is: `[KEY_TAG_EDGE][partition][source][edge_type]`
///
/// A prefix scan over it visits all rankings, destinations, and versions.
#[must_use]
pub fn edge_prefix(partition: PartitionId, source: VertexId, edge_type: EdgeType) -> Vec<u8> {
    let mut key = vertex_prefix(partition, source);
    put_i32(&mut key, edge_type.as_i32());
    key
}

/// Encode the prefix shared by every version of one logical edge.
///
/// The key format is: `[KEY_TAG_EDGE][partition][source][edge_type][ranking][destination]`
#[must_use]
pub fn logical_edge_prefix(
    partition: PartitionId,
    source: VertexId,
    edge_type: EdgeType,
    ranking: Ranking,
    destination: VertexId,
) -> Vec<u8> {
    let mut key = edge_prefix(partition, source, edge_type);
    put_i64(&mut key, ranking.as_i64());
    put_i64(&mut key, destination.as_i64());
    key
}

/// Encode a full edge key.
#[must_use]
pub fn encode_edge_key(
    partition: PartitionId,
    source: VertexId,
    edge_type: EdgeType,
    ranking: Ranking,
    destination: VertexId,
    version: Version,
) -> Vec<u8> {
    let mut key = logical_edge_prefix(partition, source, edge_type, ranking, destination);
    key.extend_from_slice(&encode_version(version));
    key
}

/// Compute the half-open key range `[start, end)` holding every stored
/// version of one logical edge.
///
/// `start` carries the newest possible version ([`Version::MAX`]) and `end`
/// the reserved [`Version::ZERO`], which is never stored. An ascending scan
/// over the range yields the versions newest first.
#[must_use]
pub fn logical_edge_range(
    partition: PartitionId,
    source: VertexId,
    edge_type: EdgeType,
    ranking: Ranking,
    destination: VertexId,
) -> (Vec<u8>, Vec<u8>) {
    let prefix = logical_edge_prefix(partition, source, edge_type, ranking, destination);
    let mut start = prefix.clone();
    start.extend_from_slice(&encode_version(Version::MAX));
    let mut end = prefix;
    end.extend_from_slice(&encode_version(Version::ZERO));
    (start, end)
}

/// Decode a full edge key.
///
/// Returns `None` if the key doesn't have the correct length or tag.
#[must_use]
pub fn decode_edge_key(key: &[u8]) -> Option<VersionedKey> {
    if key.len() != EDGE_KEY_LEN || key[0] != KEY_TAG_EDGE {
        return None;
    }
    let partition = PartitionId::new(read_u32(key, 1)?);
    let source = VertexId::new(read_i64(key, 5)?);
    let edge_type = EdgeType::new(read_i32(key, VERTEX_PREFIX_LEN)?);
    let ranking = Ranking::new(read_i64(key, EDGE_PREFIX_LEN)?);
    let destination = VertexId::new(read_i64(key, EDGE_PREFIX_LEN + 8)?);
    let version_bytes: [u8; VERSION_LEN] = key[LOGICAL_EDGE_PREFIX_LEN..].try_into().ok()?;

    let edge = EdgeKey::new(partition, source, edge_type, ranking, destination);
    Some(edge.with_version(decode_version(version_bytes)))
}
