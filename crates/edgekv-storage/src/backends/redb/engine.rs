//! Redb store implementation.

use std::path::Path;

use edgekv_core::PartitionId;
use redb::{Database, ReadableTable};
use tracing::debug;

use crate::engine::{prefix_successor, KeyValue, OrderedKvStore, StorageError, StorageResult};

use super::scan::RedbScan;
use super::tables::{encode_key, partition_end_key, DATA_TABLE};

/// Default number of entries a scan loads per batch.
const DEFAULT_SCAN_BATCH_SIZE: usize = 1000;

/// Configuration options for the Redb store.
#[derive(Debug, Clone, Copy)]
pub struct RedbConfig {
    /// Cache size in bytes.
    /// If not set, uses Redb's default.
    pub cache_size: Option<usize>,

    /// Maximum number of entries a scan holds in memory at once.
    pub scan_batch_size: usize,
}

impl RedbConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Set the scan batch size. Values below 1 are raised to 1.
    #[must_use]
    pub const fn scan_batch_size(mut self, size: usize) -> Self {
        self.scan_batch_size = if size == 0 { 1 } else { size };
        self
    }
}

impl Default for RedbConfig {
    fn default() -> Self {
        Self { cache_size: None, scan_batch_size: DEFAULT_SCAN_BATCH_SIZE }
    }
}

/// An [`OrderedKvStore`] backed by Redb.
///
/// Every `put` is its own write transaction; `multi_put` commits all entries
/// of one partition in a single transaction. Scans run inside a read
/// transaction, which gives them a consistent snapshot.
pub struct RedbStore {
    db: Database,
    scan_batch_size: usize,
}

impl RedbStore {
    /// Open or create a database at the given path with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Open or create a database at the given path with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or created.
    pub fn open_with_config(path: impl AsRef<Path>, config: RedbConfig) -> StorageResult<Self> {
        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }

        let db = builder.create(path.as_ref()).map_err(|e| StorageError::Open(e.to_string()))?;
        debug!(path = %path.as_ref().display(), "opened redb store");

        Ok(Self { db, scan_batch_size: config.scan_batch_size })
    }

    /// Create an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> StorageResult<Self> {
        Self::in_memory_with_config(RedbConfig::default())
    }

    /// Create an in-memory database with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory_with_config(config: RedbConfig) -> StorageResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;

        Ok(Self { db, scan_batch_size: config.scan_batch_size })
    }

    fn write_all(&self, partition: PartitionId, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        let tx = self.db.begin_write().map_err(|e| StorageError::Transaction(e.to_string()))?;
        {
            let mut table =
                tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
            for (key, value) in entries {
                let physical = encode_key(partition, key);
                table
                    .insert(physical.as_slice(), *value)
                    .map_err(|e| StorageError::Internal(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| StorageError::Transaction(e.to_string()))
    }

    fn scan(&self, start: Vec<u8>, end: Option<Vec<u8>>) -> StorageResult<RedbScan> {
        let tx = self.db.begin_read().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(RedbScan::new(tx, start, end, self.scan_batch_size))
    }
}

impl OrderedKvStore for RedbStore {
    type Scan<'a> = RedbScan;

    fn put(&self, partition: PartitionId, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.write_all(partition, &[(key, value)])
    }

    fn multi_put(&self, partition: PartitionId, entries: &[KeyValue]) -> StorageResult<()> {
        let borrowed: Vec<(&[u8], &[u8])> =
            entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())).collect();
        self.write_all(partition, &borrowed)
    }

    fn get(&self, partition: PartitionId, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let tx = self.db.begin_read().map_err(|e| StorageError::Transaction(e.to_string()))?;
        let table = match tx.open_table(DATA_TABLE) {
            Ok(t) => t,
            // No data table means no data, which is not an error
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StorageError::Internal(e.to_string())),
        };

        let physical = encode_key(partition, key);
        let value = table
            .get(physical.as_slice())
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn prefix(&self, partition: PartitionId, prefix: &[u8]) -> StorageResult<RedbScan> {
        let start = encode_key(partition, prefix);
        let end = match prefix_successor(prefix) {
            Some(successor) => Some(encode_key(partition, &successor)),
            None => partition_end_key(partition),
        };
        self.scan(start, end)
    }

    fn range(&self, partition: PartitionId, start: &[u8], end: &[u8]) -> StorageResult<RedbScan> {
        if start >= end {
            return Ok(RedbScan::empty());
        }
        self.scan(encode_key(partition, start), Some(encode_key(partition, end)))
    }
}

// Note: RedbStore is Send + Sync because redb::Database is Send + Sync.
