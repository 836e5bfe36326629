//! Property-based tests for the edge key layout.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use super::keys::{decode_edge_key, edge_prefix, logical_edge_range};
use crate::types::{EdgeKey, EdgeType, PartitionId, Ranking, Version, VersionedKey, VertexId};

/// Strategy for generating arbitrary `EdgeKey` instances.
fn arb_edge_key() -> impl Strategy<Value = EdgeKey> {
    (any::<u32>(), any::<i64>(), any::<i32>(), any::<i64>(), any::<i64>()).prop_map(
        |(part, src, ty, rank, dst)| {
            EdgeKey::new(
                PartitionId::new(part),
                VertexId::new(src),
                EdgeType::new(ty),
                Ranking::new(rank),
                VertexId::new(dst),
            )
        },
    )
}

/// Strategy for versions that may be stored.
fn arb_version() -> impl Strategy<Value = Version> {
    (1..=u64::MAX).prop_map(Version::new)
}

/// Strategy for generating arbitrary `VersionedKey` instances.
fn arb_versioned_key() -> impl Strategy<Value = VersionedKey> {
    (arb_edge_key(), arb_version()).prop_map(|(edge, version)| edge.with_version(version))
}

/// The order the key layout promises to preserve.
fn declared_order(key: &VersionedKey) -> (u32, i64, i32, i64, i64, std::cmp::Reverse<u64>) {
    (
        key.edge.partition.as_u32(),
        key.edge.source.as_i64(),
        key.edge.edge_type.as_i32(),
        key.edge.ranking.as_i64(),
        key.edge.destination.as_i64(),
        std::cmp::Reverse(key.version.as_u64()),
    )
}

proptest! {
    #[test]
    fn versioned_key_roundtrip(key in arb_versioned_key()) {
        let encoded = key.encode();
        let decoded = decode_edge_key(&encoded).unwrap();
        prop_assert_eq!(decoded, key);
    }

    #[test]
    fn byte_order_matches_declared_order(a in arb_versioned_key(), b in arb_versioned_key()) {
        let bytes = a.encode().cmp(&b.encode());
        let fields = declared_order(&a).cmp(&declared_order(&b));
        prop_assert_eq!(bytes, fields);
    }

    #[test]
    fn newer_version_sorts_first(edge in arb_edge_key(), v1 in arb_version(), v2 in arb_version()) {
        prop_assume!(v1 != v2);
        let (newer, older) = if v1 > v2 { (v1, v2) } else { (v2, v1) };
        prop_assert!(edge.with_version(newer).encode() < edge.with_version(older).encode());
    }

    #[test]
    fn version_range_contains_exactly_that_edge(
        edge in arb_edge_key(),
        other in arb_edge_key(),
        version in arb_version(),
    ) {
        let (start, end) = logical_edge_range(
            edge.partition,
            edge.source,
            edge.edge_type,
            edge.ranking,
            edge.destination,
        );
        let own = edge.with_version(version).encode();
        prop_assert!(own >= start && own < end);

        if other != edge {
            let foreign = other.with_version(version).encode();
            prop_assert!(foreign < start || foreign >= end);
        }
    }

    #[test]
    fn edge_prefix_groups_by_source_and_type(key in arb_versioned_key()) {
        let prefix = edge_prefix(key.edge.partition, key.edge.source, key.edge.edge_type);
        prop_assert!(key.encode().starts_with(&prefix));
    }
}
