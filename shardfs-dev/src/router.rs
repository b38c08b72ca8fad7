use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use shardfs_api::{FileService, FsError, FsResult, Router, ShardId};

/// Ownership oracle with a role table fixed at construction and remote
/// handles registered afterwards (the handles are usually other nodes,
/// which do not exist yet while this router is being built).
///
/// Role queries are answered per call, as the `Router` contract demands;
/// swapping this for a live membership view changes nothing above it.
pub struct StaticRouter {
    masters: HashSet<ShardId>,
    slaves: HashSet<ShardId>,
    remotes: scc::HashMap<ShardId, Arc<dyn FileService>>,
}

impl StaticRouter {
    pub fn new(
        masters: impl IntoIterator<Item = ShardId>,
        slaves: impl IntoIterator<Item = ShardId>,
    ) -> Self {
        Self {
            masters: masters.into_iter().collect(),
            slaves: slaves.into_iter().collect(),
            remotes: scc::HashMap::new(),
        }
    }

    /// Registers the handle serving `shard`'s master copy. Re-registering
    /// replaces the previous handle.
    pub async fn register_remote(
        &self,
        shard: ShardId,
        handle: Arc<dyn FileService>,
    ) {
        self.remotes.upsert_async(shard, handle).await;
    }
}

#[async_trait]
impl Router for StaticRouter {
    async fn is_local_master(&self, shard: ShardId) -> FsResult<bool> {
        Ok(self.masters.contains(&shard))
    }

    async fn is_local_slave(&self, shard: ShardId) -> FsResult<bool> {
        Ok(self.slaves.contains(&shard))
    }

    async fn remote_for(
        &self,
        shard: ShardId,
    ) -> FsResult<Arc<dyn FileService>> {
        let handle = self.remotes.get_async(&shard).await;
        handle.map(|entry| entry.get().clone()).ok_or_else(|| {
            FsError::unavailable(shard, "no reachable owner registered")
        })
    }
}
