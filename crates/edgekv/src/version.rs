//! Version allocation for versioned edge types.
//!
//! Versions are wall-clock microseconds, bumped when needed so that every
//! version handed out for one logical edge is strictly greater than the last.
//! Allocation for one edge is serialized through its map entry; different
//! edges allocate concurrently.
//!
//! State is kept per edge only while the edge's last version is at or ahead
//! of the clock. [`VersionAllocator::evict_stale`] drops the rest.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use edgekv_core::{EdgeKey, Version};
use thiserror::Error;

/// Errors that can occur while allocating a version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The edge already holds the largest representable version.
    #[error("version space exhausted for edge {0:?}")]
    Exhausted(EdgeKey),
}

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Hands out strictly increasing versions per logical edge.
///
/// Every allocated version is greater than [`Version::SINGLE_SLOT`], so
/// versioned records never share a key with a single-slot record.
///
/// # Example
///
/// ```
/// use edgekv::VersionAllocator;
/// use edgekv_core::{EdgeKey, EdgeType, PartitionId, Ranking, VertexId};
///
/// let allocator = VersionAllocator::new();
/// let edge = EdgeKey::new(
///     PartitionId::new(0),
///     VertexId::new(1),
///     EdgeType::new(2),
///     Ranking::new(0),
///     VertexId::new(3),
/// );
///
/// let first = allocator.next(&edge).unwrap();
/// let second = allocator.next(&edge).unwrap();
/// assert!(second > first);
/// ```
pub struct VersionAllocator {
    last: DashMap<EdgeKey, u64>,
    /// Lower bound for every allocation, raised on eviction.
    floor: AtomicU64,
    clock: Clock,
}

impl VersionAllocator {
    /// Create an allocator driven by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_micros)
    }

    /// Create an allocator driven by a custom clock returning microseconds.
    #[must_use]
    pub fn with_clock(clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        Self { last: DashMap::new(), floor: AtomicU64::new(0), clock: Arc::new(clock) }
    }

    /// Allocate the next version for `edge`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Exhausted`] if the edge already reached [`Version::MAX`].
    pub fn next(&self, edge: &EdgeKey) -> Result<Version, VersionError> {
        // The entry guard holds the shard lock until the new value is stored
        let mut last = self.last.entry(*edge).or_insert(Version::SINGLE_SLOT.as_u64());
        let bumped = last.checked_add(1).ok_or(VersionError::Exhausted(*edge))?;
        let next = bumped.max(self.now());
        *last = next;
        Ok(Version::new(next))
    }

    /// The last version allocated for `edge`, if any.
    #[must_use]
    pub fn last(&self, edge: &EdgeKey) -> Option<Version> {
        self.last.get(edge).map(|v| Version::new(*v))
    }

    /// Number of edges with allocation state.
    #[must_use]
    pub fn tracked_edges(&self) -> usize {
        self.last.len()
    }

    /// Drop the state of every edge whose last version is behind the clock.
    /// Returns how many edges were dropped.
    ///
    /// Versions allocated afterwards are at least the current clock reading,
    /// even if the clock later goes backwards, so they still exceed every
    /// version handed out for a dropped edge.
    pub fn evict_stale(&self) -> usize {
        let now = self.now();
        self.floor.fetch_max(now, Ordering::AcqRel);

        let mut evicted = 0;
        self.last.retain(|_, last| {
            let keep = *last >= now;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    fn now(&self) -> u64 {
        (self.clock)().max(self.floor.load(Ordering::Acquire))
    }

    /// Drop the allocation state for `edge`.
    ///
    /// Later versions for the edge are then ordered by the clock alone.
    pub fn forget(&self, edge: &EdgeKey) -> Option<Version> {
        self.last.remove(edge).map(|(_, v)| Version::new(v))
    }
}

impl Default for VersionAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VersionAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionAllocator").field("tracked_edges", &self.last.len()).finish_non_exhaustive()
    }
}

fn system_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
}
