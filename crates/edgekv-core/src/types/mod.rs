//! Core data types for `EdgeKV`.
//!
//! This module defines the identifiers that address an edge and the key and
//! record types built from them.

mod edge;
mod id;

pub use edge::{EdgeKey, EdgeRecord, VersionedKey};
pub use id::{EdgeType, PartitionId, Ranking, SpaceId, Version, VertexId};
