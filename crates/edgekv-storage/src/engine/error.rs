//! Storage error types.

use edgekv_core::PartitionId;
use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A transaction could not be started or committed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// The backend failed while reading or writing.
    #[error("internal storage error: {0}")]
    Internal(String),

    /// The partition refused the write.
    #[error("writes rejected by partition {0}")]
    WriteRejected(PartitionId),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StorageError::WriteRejected(PartitionId::new(4));
        assert_eq!(err.to_string(), "writes rejected by partition 4");

        let err = StorageError::Internal("disk on fire".to_owned());
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
