use std::sync::Arc;

use shardfs_api::FileService;
use shardfs_node::Coordinator;
use tracing::info;

use crate::{Config, MemDriver, ModuloSharder, StaticRouter};

/// In-process cluster: every node is a real `Coordinator`, and remote
/// hops go through the same `FileService` trait an RPC client adapter
/// would implement, so the routing behavior is the one a wire deployment
/// gets.
///
/// Shard `s` is mastered by node `s % nodes`; the next `replicas` nodes
/// hold slave copies.
pub struct LocalCluster {
    nodes: Vec<Arc<Coordinator>>,
}

impl LocalCluster {
    pub async fn new(conf: &Config) -> Self {
        Self::build(conf.nodes, conf.shards, conf.replicas).await
    }

    /// # Panics
    ///
    /// Panics when `node_count` or `shard_count` is zero.
    pub async fn build(
        node_count: u64,
        shard_count: u64,
        replicas: u64,
    ) -> Self {
        assert!(node_count > 0, "node count must be nonzero");
        let mut routers = Vec::new();
        let mut nodes = Vec::new();
        for node_id in 0..node_count {
            let mut masters = Vec::new();
            let mut slaves = Vec::new();
            for shard in 0..shard_count {
                let owner = shard % node_count;
                if owner == node_id {
                    masters.push(shard);
                } else if (1..=replicas)
                    .any(|r| (owner + r) % node_count == node_id)
                {
                    slaves.push(shard);
                }
            }
            info!(node_id, ?masters, ?slaves, "assigning shard roles");
            let router = Arc::new(StaticRouter::new(
                masters.iter().copied(),
                slaves.iter().copied(),
            ));
            let node = Arc::new(Coordinator::new(
                Arc::new(ModuloSharder::new(shard_count)),
                router.clone(),
                Arc::new(MemDriver::new()),
            ));
            routers.push(router);
            nodes.push(node);
        }
        // Every router can reach the master of every shard, so any node
        // can take any request.
        for shard in 0..shard_count {
            let owner = (shard % node_count) as usize;
            let handle: Arc<dyn FileService> = nodes[owner].clone();
            for router in &routers {
                router.register_remote(shard, handle.clone()).await;
            }
        }
        Self { nodes }
    }

    /// # Panics
    ///
    /// Panics when `index` is out of range; use [`Self::nodes`] to
    /// iterate without knowing the cluster size.
    pub fn node(&self, index: usize) -> Arc<Coordinator> {
        self.nodes[index].clone()
    }

    pub fn nodes(&self) -> &[Arc<Coordinator>] {
        &self.nodes
    }
}
