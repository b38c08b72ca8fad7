use std::future::Future;

use shardfs_api::{FsError, FsResult, Router, ShardId, Sharder};

/// Shard role from the point of view of the local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Master,
    Slave,
}

/// Shards of the given role owned by this node, in ascending shard order.
///
/// Queried fresh on every call. The result is a snapshot for exactly one
/// fan-out pass and must not be reused across requests; ownership can
/// change between calls.
pub(crate) async fn owned_shards(
    sharder: &dyn Sharder,
    router: &dyn Router,
    role: Role,
) -> FsResult<Vec<ShardId>> {
    let mut shards = Vec::new();
    for shard in 0..sharder.shard_count() {
        let owned = match role {
            Role::Master => router.is_local_master(shard).await?,
            Role::Slave => router.is_local_slave(shard).await?,
        };
        if owned {
            shards.push(shard);
        }
    }
    Ok(shards)
}

/// Applies `op` to every shard in the given order, stopping at the first
/// failure. Shards applied before the failure are not rolled back; the
/// returned error names the shard that failed.
pub(crate) async fn apply<F, Fut>(shards: &[ShardId], mut op: F) -> FsResult<()>
where
    F: FnMut(ShardId) -> Fut,
    Fut: Future<Output = FsResult<()>>,
{
    for &shard in shards {
        op(shard).await.map_err(|err| FsError::PartialFailure {
            shard,
            source: Box::new(err),
        })?;
    }
    Ok(())
}
