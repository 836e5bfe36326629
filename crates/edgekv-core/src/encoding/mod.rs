//! Key encoding for ordered storage.
//!
//! The [`keys`] module maps edge identifiers to a fixed-width byte layout
//! whose lexicographic order equals the declared order of the fields, and
//! derives the prefixes and ranges used to scan it.
//!
//! # Example
//!
//! ```
//! use edgekv_core::encoding::keys::{decode_edge_key, encode_edge_key, edge_prefix};
//! use edgekv_core::types::{EdgeType, PartitionId, Ranking, Version, VertexId};
//!
//! let part = PartitionId::new(2);
//! let src = VertexId::new(-5);
//! let ty = EdgeType::new(7);
//!
//! let key = encode_edge_key(part, src, ty, Ranking::new(0), VertexId::new(9), Version::new(4));
//! assert!(key.starts_with(&edge_prefix(part, src, ty)));
//!
//! let decoded = decode_edge_key(&key).unwrap();
//! assert_eq!(decoded.version, Version::new(4));
//! ```

pub mod keys;

#[cfg(test)]
mod proptest_tests;
