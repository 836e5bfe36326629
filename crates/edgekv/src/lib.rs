//! `EdgeKV`
//!
//! The edge write path of a partitioned graph store.
//!
//! # Overview
//!
//! A client submits an [`AddEdgesRequest`]: edges for one space, grouped by
//! partition. The [`EdgeWriteProcessor`] writes each partition independently
//! and reports one [`ErrorCode`] per failed partition in the
//! [`AddEdgesResponse`].
//!
//! Whether a write adds a record or replaces one depends on the edge type:
//!
//! - **Versioned** edge types get a fresh [`Version`](edgekv_core::Version)
//!   from the [`VersionAllocator`] on every write, so history accumulates
//! - **Single-slot** edge types always write at one fixed version, so the
//!   latest write wins
//!
//! The [`SchemaCapability`] trait answers which kind an edge type is.
//!
//! # Example
//!
//! ```
//! use edgekv::{AddEdgesRequest, AdHocSchema, EdgeReader, EdgeWriteKey, EdgeWriteProcessor, NewEdge};
//! use edgekv_core::{EdgeType, PartitionId, Ranking, SpaceId, VertexId};
//! use edgekv_storage::backends::MemoryStore;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let space = SpaceId::new(1);
//! let schema = AdHocSchema::new();
//! schema.set_space_versioned(space, true);
//! let processor = EdgeWriteProcessor::new(MemoryStore::new(), schema);
//!
//! let key = EdgeWriteKey::new(VertexId::new(1), EdgeType::new(2), Ranking::new(0), VertexId::new(3));
//! let part = PartitionId::new(0);
//! for value in ["first", "second"] {
//!     let request = AddEdgesRequest::new(space).with_edge(part, NewEdge::new(key, value));
//!     processor.process(request).await.unwrap().into_result().unwrap();
//! }
//!
//! let versions = EdgeReader::versions(processor.store(), &key.in_partition(part)).unwrap();
//! assert_eq!(versions[0].value, b"second");
//! assert_eq!(versions[1].value, b"first");
//! # });
//! ```
//!
//! # Modules
//!
//! - [`processor`] - Batched, per-partition edge writes
//! - [`schema`] - Versioned/single-slot lookup
//! - [`version`] - Per-edge monotonic version allocation
//! - [`reader`] - Decoding stored edges back
//! - [`request`] - Request and response types
//! - [`config`] - Processor configuration
//! - [`error`] - Error types and response codes

#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod processor;
pub mod reader;
pub mod request;
pub mod schema;
pub mod version;

pub use config::ProcessorConfig;
pub use error::{ErrorCode, ProcessError, WriteError, WriteResult};
pub use processor::{BatchHandle, EdgeWriteProcessor};
pub use reader::{EdgeReader, ReadError};
pub use request::{AddEdgesRequest, AddEdgesResponse, EdgeWriteKey, NewEdge, PartitionFailure};
pub use schema::{AdHocSchema, SchemaCapability, SchemaError};
pub use version::{VersionAllocator, VersionError};
