//! Processor configuration.

use serde::{Deserialize, Serialize};

/// Default number of partitions written concurrently per batch.
pub const DEFAULT_MAX_CONCURRENT_PARTITIONS: usize = 16;

/// Default upper bound on a single edge value, in bytes.
pub const DEFAULT_MAX_VALUE_LEN: usize = 4 * 1024 * 1024;

/// Configuration options for an [`EdgeWriteProcessor`](crate::EdgeWriteProcessor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// How many partitions of one batch may be written at the same time.
    pub max_concurrent_partitions: usize,
    /// Values longer than this are rejected with `E_INVALID_KEY`.
    pub max_value_len: usize,
}

impl ProcessorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_concurrent_partitions: DEFAULT_MAX_CONCURRENT_PARTITIONS,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        }
    }

    /// Set the partition concurrency limit. Values below 1 are raised to 1.
    #[must_use]
    pub const fn max_concurrent_partitions(mut self, limit: usize) -> Self {
        self.max_concurrent_partitions = if limit == 0 { 1 } else { limit };
        self
    }

    /// Set the maximum value length in bytes.
    #[must_use]
    pub const fn max_value_len(mut self, len: usize) -> Self {
        self.max_value_len = len;
        self
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}
