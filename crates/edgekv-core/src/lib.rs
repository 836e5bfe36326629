//! `EdgeKV` Core
//!
//! This crate provides the identifiers, edge keys, and the order-preserving
//! key codec shared by the storage backends and the edge write processor.
//!
//! # Overview
//!
//! - **Identifiers**: [`SpaceId`], [`PartitionId`], [`VertexId`], [`EdgeType`],
//!   [`Ranking`], and [`Version`]
//! - **Keys**: [`EdgeKey`] names a logical edge, [`VersionedKey`] names one
//!   stored version of it
//! - **Records**: [`EdgeRecord`] pairs a versioned key with its value
//!
//! # Example
//!
//! ```
//! use edgekv_core::{EdgeKey, EdgeType, PartitionId, Ranking, Version, VertexId};
//!
//! let key = EdgeKey::new(
//!     PartitionId::new(0),
//!     VertexId::new(101),
//!     EdgeType::new(10101),
//!     Ranking::new(10102),
//!     VertexId::new(10103),
//! );
//!
//! // Newer versions sort first under byte comparison.
//! let newer = key.with_version(Version::new(20)).encode();
//! let older = key.with_version(Version::new(10)).encode();
//! assert!(newer < older);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Identifiers, keys, and records
//! - [`encoding`] - Binary key layout and scan boundaries
//! - [`error`] - Error types ([`CoreError`])

#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{
    EdgeKey, EdgeRecord, EdgeType, PartitionId, Ranking, SpaceId, Version, VersionedKey, VertexId,
};
