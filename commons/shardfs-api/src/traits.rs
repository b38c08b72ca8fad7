use std::sync::Arc;

use async_trait::async_trait;

use crate::{ByteStream, FsResult, ShardId};

/// Shard-assignment function. Pure: the same key always maps to the same
/// shard, and the mapping is computed once per request, never re-derived
/// mid-flight.
pub trait Sharder: Send + Sync {
    /// Fails with [`crate::FsError::InvalidKey`] on a malformed key
    /// (e.g. empty).
    fn shard_of(&self, key: &[u8]) -> FsResult<ShardId>;

    fn shard_count(&self) -> u64;
}

/// Cluster membership and ownership oracle for the local node.
///
/// Implementations MUST answer role queries fresh on every call. The
/// coordination layer deliberately never caches the answers: a cached
/// role could route a write to a stale master after a role change, which
/// is a split-brain class of failure, not a performance detail.
#[async_trait]
pub trait Router: Send + Sync {
    async fn is_local_master(&self, shard: ShardId) -> FsResult<bool>;

    async fn is_local_slave(&self, shard: ShardId) -> FsResult<bool>;

    /// Handle for issuing the same operation against the node that is
    /// local master for `shard`. Fails with
    /// [`crate::FsError::Unavailable`] when no reachable owner is known.
    /// Transport adapters implementing the returned handle surface their
    /// own connection failures and timeouts the same way.
    async fn remote_for(&self, shard: ShardId)
    -> FsResult<Arc<dyn FileService>>;
}

/// Local storage engine, addressed per shard. Per-shard serialization of
/// concurrent operations is the driver's business; the coordination layer
/// adds no locking of its own.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Idempotent: initializing an already-initialized repository is a
    /// no-op, which is what makes repository-wide retries safe.
    async fn init_repository(&self, repo: &str, shard: ShardId)
    -> FsResult<()>;

    async fn get_file(&self, path: &str, shard: ShardId)
    -> FsResult<ByteStream>;

    async fn put_file(
        &self,
        path: &str,
        shard: ShardId,
        data: ByteStream,
    ) -> FsResult<()>;

    /// Extracts an opaque diff describing the shard's current state.
    async fn pull_diff(&self, shard: ShardId) -> FsResult<ByteStream>;

    /// Applies a diff previously produced by [`Driver::pull_diff`] on the
    /// shard's master copy.
    async fn push_diff(&self, shard: ShardId, diff: ByteStream)
    -> FsResult<()>;
}

/// The externally visible surface of a node, repository/path-addressed.
///
/// This is also the remote-handle type handed out by
/// [`Router::remote_for`]: a forwarded request invokes the identical
/// operation on the owning node, so an in-process node, a test double and
/// an RPC client adapter are interchangeable.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Applies to every shard this node owns, master copies before slave
    /// copies. Cluster-wide fan-out across nodes is the transport and
    /// membership layer's concern.
    async fn init_repository(&self, repo: &str) -> FsResult<()>;

    async fn get_file(&self, path: &str) -> FsResult<ByteStream>;

    async fn put_file(&self, path: &str, data: ByteStream) -> FsResult<()>;

    async fn pull_diff(&self, shard: ShardId) -> FsResult<ByteStream>;

    async fn push_diff(&self, shard: ShardId, diff: ByteStream)
    -> FsResult<()>;
}
