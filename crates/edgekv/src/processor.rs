//! The edge write processor.
//!
//! A batch is split by partition. Each partition is written by its own task
//! on the blocking pool, in submission order, and reports at most one failure
//! code. Partitions never wait on each other; the batch completes when the
//! last partition task has reported.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use edgekv_core::{EdgeType, PartitionId, SpaceId, Version};
use edgekv_storage::OrderedKvStore;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::{self, JoinSet};
use tracing::{debug, info, warn};

use crate::config::ProcessorConfig;
use crate::error::{ErrorCode, ProcessError, WriteError, WriteResult};
use crate::request::{AddEdgesRequest, AddEdgesResponse, NewEdge};
use crate::schema::{SchemaCapability, SchemaError};
use crate::version::VersionAllocator;

/// Writes batches of edges into an [`OrderedKvStore`].
///
/// Versioned edge types get a fresh version per write, so every write adds a
/// record. Single-slot edge types always write at [`Version::SINGLE_SLOT`],
/// so a later write replaces the earlier one.
///
/// Cloning the processor is cheap and shares the store, schema, allocator,
/// and shutdown state.
///
/// # Example
///
/// ```
/// use edgekv::{AddEdgesRequest, AdHocSchema, EdgeWriteKey, EdgeWriteProcessor, NewEdge};
/// use edgekv_core::{EdgeType, PartitionId, Ranking, SpaceId, VertexId};
/// use edgekv_storage::backends::MemoryStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let schema = AdHocSchema::new();
/// schema.set_space_versioned(SpaceId::new(1), true);
/// let processor = EdgeWriteProcessor::new(MemoryStore::new(), schema);
///
/// let key = EdgeWriteKey::new(VertexId::new(1), EdgeType::new(2), Ranking::new(0), VertexId::new(3));
/// let request = AddEdgesRequest::new(SpaceId::new(1))
///     .with_edge(PartitionId::new(0), NewEdge::new(key, "hello"));
///
/// let response = processor.process(request).await.unwrap();
/// assert!(response.is_success());
/// # });
/// ```
pub struct EdgeWriteProcessor<S, C> {
    inner: Arc<Inner<S, C>>,
}

struct Inner<S, C> {
    store: S,
    schema: C,
    allocator: VersionAllocator,
    config: ProcessorConfig,
    shutting_down: AtomicBool,
}

type SchemaCache = HashMap<EdgeType, Result<bool, SchemaError>>;

impl<S, C> EdgeWriteProcessor<S, C>
where
    S: OrderedKvStore + 'static,
    C: SchemaCapability + 'static,
{
    /// Create a processor with default configuration.
    #[must_use]
    pub fn new(store: S, schema: C) -> Self {
        Self::with_config(store, schema, ProcessorConfig::default())
    }

    /// Create a processor with custom configuration.
    #[must_use]
    pub fn with_config(store: S, schema: C, config: ProcessorConfig) -> Self {
        Self::with_allocator(store, schema, config, VersionAllocator::new())
    }

    /// Create a processor with a caller-supplied version allocator.
    #[must_use]
    pub fn with_allocator(
        store: S,
        schema: C,
        config: ProcessorConfig,
        allocator: VersionAllocator,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                schema,
                allocator,
                config,
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// The schema used to classify edge types.
    #[must_use]
    pub fn schema(&self) -> &C {
        &self.inner.schema
    }

    /// The version allocator.
    #[must_use]
    pub fn allocator(&self) -> &VersionAllocator {
        &self.inner.allocator
    }

    /// The processor configuration.
    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.inner.config
    }

    /// Start writing `request` and return a handle that resolves to the response.
    ///
    /// Work starts immediately; the handle need not be polled for the writes
    /// to happen. Must be called from within a Tokio runtime, otherwise the
    /// handle resolves to [`ProcessError::NoRuntime`].
    pub fn submit(&self, request: AddEdgesRequest) -> BatchHandle {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => return BatchHandle::failed(ProcessError::NoRuntime(e.to_string())),
        };

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            let response = inner.run_batch(request).await;
            // The caller may have dropped the handle; the writes are done either way
            let _ = tx.send(response);
        });

        BatchHandle::pending(rx)
    }

    /// Write `request` and wait for the response.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] if the batch could not run to completion.
    pub async fn process(&self, request: AddEdgesRequest) -> Result<AddEdgesResponse, ProcessError> {
        self.submit(request).await
    }

    /// Stop issuing writes. Partitions with edges left unwritten report
    /// [`ErrorCode::ShuttingDown`]. Writes already issued complete.
    pub fn shutdown(&self) {
        if !self.inner.shutting_down.swap(true, Ordering::AcqRel) {
            info!("edge write processor shutting down");
        }
    }

    /// Whether [`EdgeWriteProcessor::shutdown`] has been called.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::Acquire)
    }
}

impl<S, C> Clone for EdgeWriteProcessor<S, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S, C> Inner<S, C>
where
    S: OrderedKvStore + 'static,
    C: SchemaCapability + 'static,
{
    async fn run_batch(self: Arc<Self>, request: AddEdgesRequest) -> AddEdgesResponse {
        let AddEdgesRequest { space_id, overwritable, parts } = request;
        let partition_count = parts.len();
        debug!(space = %space_id, partitions = partition_count, overwritable, "add edges batch started");

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_partitions.max(1)));
        let mut pending: BTreeSet<PartitionId> = parts.keys().copied().collect();
        let mut tasks = JoinSet::new();

        for (partition, edges) in parts {
            let inner = Arc::clone(&self);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let Ok(permit) = permits.acquire_owned().await else {
                    return (partition, Some(ErrorCode::Internal));
                };
                let written =
                    task::spawn_blocking(move || inner.write_partition(space_id, partition, &edges))
                        .await;
                drop(permit);

                let code = written.unwrap_or_else(|e| {
                    warn!(partition = %partition, error = %e, "partition task failed");
                    Some(ErrorCode::Internal)
                });
                (partition, code)
            });
        }

        let mut failures = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((partition, code)) => {
                    pending.remove(&partition);
                    if let Some(code) = code {
                        failures.insert(partition, code);
                    }
                }
                Err(e) => warn!(error = %e, "partition task did not report"),
            }
        }
        // A partition that never reported did not finish
        for partition in pending {
            failures.insert(partition, ErrorCode::Internal);
        }

        let evicted = self.allocator.evict_stale();
        if evicted > 0 {
            debug!(evicted, tracked = self.allocator.tracked_edges(), "evicted stale version state");
        }

        let response = AddEdgesResponse::from_failures(failures);
        info!(
            space = %space_id,
            partitions = partition_count,
            failed = response.failures().len(),
            "add edges batch complete"
        );
        response
    }

    /// Write one partition's edges in order. Returns the first failure code.
    fn write_partition(
        &self,
        space: SpaceId,
        partition: PartitionId,
        edges: &[NewEdge],
    ) -> Option<ErrorCode> {
        debug!(space = %space, partition = %partition, edges = edges.len(), "writing partition");

        let mut cache = SchemaCache::new();
        let mut first_failure = None;

        for (issued, edge) in edges.iter().enumerate() {
            if self.shutting_down.load(Ordering::Acquire) {
                let err = WriteError::ShuttingDown;
                warn!(
                    partition = %partition,
                    skipped = edges.len() - issued,
                    code = %err.code(),
                    "shutting down, remaining edges not written"
                );
                first_failure.get_or_insert(err.code());
                break;
            }

            match self.write_edge(space, partition, edge, &mut cache) {
                Ok(version) => {
                    debug!(partition = %partition, edge = ?edge.key, version = %version, "edge written");
                }
                Err(e) => {
                    warn!(
                        partition = %partition,
                        edge = ?edge.key,
                        code = %e.code(),
                        error = %e,
                        "edge write failed"
                    );
                    first_failure.get_or_insert(e.code());
                }
            }
        }

        debug!(partition = %partition, failed = first_failure.is_some(), "partition finished");
        first_failure
    }

    fn write_edge(
        &self,
        space: SpaceId,
        partition: PartitionId,
        edge: &NewEdge,
        cache: &mut SchemaCache,
    ) -> WriteResult<Version> {
        self.validate(edge)?;

        let edge_type = edge.key.edge_type;
        let versioned = cache
            .entry(edge_type)
            .or_insert_with(|| self.schema.is_versioned(space, edge_type))
            .clone()?;

        let key = edge.key.in_partition(partition);
        let version = if versioned { self.allocator.next(&key)? } else { Version::SINGLE_SLOT };

        self.store.put(partition, &key.with_version(version).encode(), &edge.value)?;
        Ok(version)
    }

    fn validate(&self, edge: &NewEdge) -> WriteResult<()> {
        if edge.value.len() > self.config.max_value_len {
            return Err(WriteError::InvalidKey(format!(
                "value of {} bytes exceeds limit of {} bytes",
                edge.value.len(),
                self.config.max_value_len
            )));
        }
        Ok(())
    }
}

/// Resolves to the response of a submitted batch.
///
/// Dropping the handle does not cancel the batch.
#[must_use = "a batch handle does nothing unless awaited; the writes still happen"]
pub struct BatchHandle {
    state: HandleState,
}

enum HandleState {
    Pending(oneshot::Receiver<AddEdgesResponse>),
    Failed(ProcessError),
    Done,
}

impl BatchHandle {
    fn pending(rx: oneshot::Receiver<AddEdgesResponse>) -> Self {
        Self { state: HandleState::Pending(rx) }
    }

    fn failed(err: ProcessError) -> Self {
        Self { state: HandleState::Failed(err) }
    }
}

impl Future for BatchHandle {
    type Output = Result<AddEdgesResponse, ProcessError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let result = match &mut this.state {
            HandleState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(received) => received.map_err(|_| ProcessError::Dropped),
            },
            HandleState::Failed(err) => Err(err.clone()),
            HandleState::Done => Err(ProcessError::AlreadyCompleted),
        };
        this.state = HandleState::Done;
        Poll::Ready(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use edgekv_core::{Ranking, VertexId};
    use edgekv_storage::backends::MemoryStore;

    use super::*;
    use crate::request::EdgeWriteKey;
    use crate::schema::AdHocSchema;

    const SPACE: SpaceId = SpaceId::new(1);

    fn processor(versioned: bool) -> EdgeWriteProcessor<MemoryStore, AdHocSchema> {
        let schema = AdHocSchema::new();
        schema.set_space_versioned(SPACE, versioned);
        EdgeWriteProcessor::new(MemoryStore::new(), schema)
    }

    fn edge(ty: i32, value: &str) -> NewEdge {
        NewEdge::new(
            EdgeWriteKey::new(VertexId::new(1), EdgeType::new(ty), Ranking::new(0), VertexId::new(2)),
            value,
        )
    }

    #[test]
    fn single_slot_writes_replace() {
        let p = processor(false);
        let edges = vec![edge(5, "a"), edge(5, "b")];
        assert_eq!(p.inner.write_partition(SPACE, PartitionId::new(0), &edges), None);
        assert_eq!(p.store().len(PartitionId::new(0)), 1);
        assert_eq!(p.allocator().tracked_edges(), 0);
    }

    #[test]
    fn versioned_writes_accumulate() {
        let p = processor(true);
        let edges = vec![edge(5, "a"), edge(5, "b"), edge(5, "c")];
        assert_eq!(p.inner.write_partition(SPACE, PartitionId::new(0), &edges), None);
        assert_eq!(p.store().len(PartitionId::new(0)), 3);
    }

    #[tokio::test]
    async fn batch_evicts_version_state_behind_the_clock() {
        let schema = AdHocSchema::new();
        schema.set_space_versioned(SPACE, true);
        let clock = Arc::new(std::sync::atomic::AtomicU64::new(1_000));
        let now = Arc::clone(&clock);
        let p = EdgeWriteProcessor::with_allocator(
            MemoryStore::new(),
            schema,
            ProcessorConfig::default(),
            VersionAllocator::with_clock(move || now.load(Ordering::SeqCst)),
        );
        let part = PartitionId::new(0);

        let first = AddEdgesRequest::new(SPACE).with_edge(part, edge(5, "a")).with_edge(part, edge(5, "b"));
        assert!(p.process(first).await.unwrap().is_success());
        // The second write of the batch ran ahead of the clock
        assert_eq!(p.allocator().tracked_edges(), 1);

        clock.store(2_000, Ordering::SeqCst);
        let second = AddEdgesRequest::new(SPACE).with_edge(part, edge(6, "c"));
        assert!(p.process(second).await.unwrap().is_success());
        let key = edge(5, "").key.in_partition(part);
        assert_eq!(p.allocator().last(&key), None);
        assert_eq!(p.allocator().tracked_edges(), 1);

        let third = AddEdgesRequest::new(SPACE).with_edge(part, edge(5, "d"));
        assert!(p.process(third).await.unwrap().is_success());
        let versions = crate::reader::EdgeReader::versions(p.store(), &key).unwrap();
        let values: Vec<_> = versions.iter().map(|r| r.value.clone()).collect();
        assert_eq!(values, vec![b"d".to_vec(), b"b".to_vec(), b"a".to_vec()]);
    }

    fn limited(max_value_len: usize) -> EdgeWriteProcessor<MemoryStore, AdHocSchema> {
        let schema = AdHocSchema::new();
        schema.set_space_versioned(SPACE, false);
        EdgeWriteProcessor::with_config(
            MemoryStore::new(),
            schema,
            ProcessorConfig::new().max_value_len(max_value_len),
        )
    }

    #[test]
    fn first_failure_wins_and_later_edges_still_run() {
        let p = limited(4);
        let edges = vec![edge(5, "12345"), edge(6, "too long"), edge(5, "ok")];
        let code = p.inner.write_partition(SPACE, PartitionId::new(0), &edges);
        assert_eq!(code, Some(ErrorCode::InvalidKey));
        assert_eq!(p.store().len(PartitionId::new(0)), 1);
    }

    #[test]
    fn edge_type_zero_is_written() {
        let p = processor(false);
        p.schema().set_strict_edge_types(SPACE, true);
        p.schema().set_edge_type_versioned(SPACE, EdgeType::new(0), false);
        let code = p.inner.write_partition(SPACE, PartitionId::new(0), &[edge(0, "zero")]);
        assert_eq!(code, None);
        assert_eq!(p.store().len(PartitionId::new(0)), 1);
    }

    #[test]
    fn oversized_value_is_invalid() {
        let p = limited(4);
        let code = p.inner.write_partition(SPACE, PartitionId::new(0), &[edge(5, "12345")]);
        assert_eq!(code, Some(ErrorCode::InvalidKey));
        assert!(p.store().is_empty(PartitionId::new(0)));
    }

    #[test]
    fn unknown_space_is_schema_not_found() {
        let p = processor(true);
        let code = p.inner.write_partition(SpaceId::new(99), PartitionId::new(0), &[edge(5, "x")]);
        assert_eq!(code, Some(ErrorCode::SchemaNotFound));
    }

    #[test]
    fn store_failure_is_reported() {
        let p = processor(false);
        p.store().fail_writes(PartitionId::new(4));
        let code = p.inner.write_partition(SPACE, PartitionId::new(4), &[edge(5, "x")]);
        assert_eq!(code, Some(ErrorCode::StoreFailure));
    }

    #[test]
    fn shutdown_skips_remaining_edges() {
        let p = processor(false);
        p.shutdown();
        assert!(p.is_shutting_down());
        let code = p.inner.write_partition(SPACE, PartitionId::new(0), &[edge(5, "x")]);
        assert_eq!(code, Some(ErrorCode::ShuttingDown));
        assert!(p.store().is_empty(PartitionId::new(0)));
    }

    #[test]
    fn submit_outside_runtime_fails() {
        let p = processor(false);
        let handle = p.submit(AddEdgesRequest::new(SPACE));
        let result = tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(handle);
        assert!(matches!(result, Err(ProcessError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn empty_batch_succeeds() {
        let p = processor(false);
        let response = p.process(AddEdgesRequest::new(SPACE)).await.unwrap();
        assert!(response.is_success());
    }
}
