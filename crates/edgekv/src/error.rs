//! Error types for the edge write path.

use std::fmt;

use edgekv_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::PartitionFailure;
use crate::schema::SchemaError;
use crate::version::VersionError;

/// Per-partition failure codes reported in an
/// [`AddEdgesResponse`](crate::AddEdgesResponse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The space or edge type is unknown to the schema.
    #[serde(rename = "E_SCHEMA_NOT_FOUND")]
    SchemaNotFound,
    /// The edge could not be turned into a storable key.
    #[serde(rename = "E_INVALID_KEY")]
    InvalidKey,
    /// The store rejected or failed the write.
    #[serde(rename = "E_STORE_FAILURE")]
    StoreFailure,
    /// The processor was shut down before every edge was issued.
    #[serde(rename = "E_SHUTTING_DOWN")]
    ShuttingDown,
    /// The partition task did not complete.
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    /// The stable string form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchemaNotFound => "E_SCHEMA_NOT_FOUND",
            Self::InvalidKey => "E_INVALID_KEY",
            Self::StoreFailure => "E_STORE_FAILURE",
            Self::ShuttingDown => "E_SHUTTING_DOWN",
            Self::Internal => "E_INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while writing edges.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The schema does not know the space or edge type.
    #[error("schema not found: {0}")]
    SchemaNotFound(#[from] SchemaError),

    /// The edge cannot be stored under a valid key.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The store failed the write.
    #[error("store failure: {0}")]
    StoreFailure(#[from] StorageError),

    /// The processor is shutting down.
    #[error("processor is shutting down")]
    ShuttingDown,

    /// Some partitions of a batch failed.
    #[error("{} partition(s) failed", .failures.len())]
    PartialBatchFailure {
        /// The failed partitions and their codes.
        failures: Vec<PartitionFailure>,
    },
}

impl From<VersionError> for WriteError {
    fn from(err: VersionError) -> Self {
        Self::InvalidKey(err.to_string())
    }
}

impl WriteError {
    /// The response code this error is reported as.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SchemaNotFound(_) => ErrorCode::SchemaNotFound,
            Self::InvalidKey(_) => ErrorCode::InvalidKey,
            Self::StoreFailure(_) => ErrorCode::StoreFailure,
            Self::ShuttingDown => ErrorCode::ShuttingDown,
            Self::PartialBatchFailure { failures } => {
                failures.first().map_or(ErrorCode::Internal, |f| f.code)
            }
        }
    }
}

/// Errors that prevent a batch from producing a response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// The batch was submitted outside a Tokio runtime.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// The batch was dropped before it produced a response.
    #[error("batch dropped before completion")]
    Dropped,

    /// The handle was polled again after it already resolved.
    #[error("batch handle polled after completion")]
    AlreadyCompleted,
}

/// Result type for edge write operations.
pub type WriteResult<T> = Result<T, WriteError>;
