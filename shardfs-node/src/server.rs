use std::sync::Arc;

use async_trait::async_trait;
use shardfs_api::{
    ByteStream, Driver, FileService, FsError, FsResult, Placement, Router,
    ShardId, Sharder,
};
use tracing::{debug, info};

use crate::fanout::{self, Role};
use crate::relay;

/// Entry point for every externally visible operation of a node.
///
/// Combines the three collaborators: the sharder decides *which* shard a
/// request touches, the router decides *where* that shard lives right
/// now, and the driver performs the operation when it lives here.
/// Anything else is forwarded to the owning node through the handle the
/// router supplies, crossing at most one inter-node hop.
///
/// Holds no state between requests. Ownership is re-resolved through the
/// router on every call so a role change between calls takes effect
/// immediately.
pub struct Coordinator {
    sharder: Arc<dyn Sharder>,
    router: Arc<dyn Router>,
    driver: Arc<dyn Driver>,
}

impl Coordinator {
    pub fn new(
        sharder: Arc<dyn Sharder>,
        router: Arc<dyn Router>,
        driver: Arc<dyn Driver>,
    ) -> Self {
        Self {
            sharder,
            router,
            driver,
        }
    }

    /// `None` when this node is master for `shard` and must serve from
    /// local storage; otherwise the handle of the owning node. This is
    /// the only place the local-vs-forward decision is made.
    async fn delegate(
        &self,
        shard: ShardId,
    ) -> FsResult<Option<Arc<dyn FileService>>> {
        if self.router.is_local_master(shard).await? {
            Ok(None)
        } else {
            let remote = self.router.remote_for(shard).await?;
            Ok(Some(remote))
        }
    }

    fn check_shard(&self, shard: ShardId) -> FsResult<()> {
        if shard >= self.sharder.shard_count() {
            return Err(FsError::InvalidKey(format!(
                "shard {shard} out of range (shard count {})",
                self.sharder.shard_count()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FileService for Coordinator {
    async fn init_repository(&self, repo: &str) -> FsResult<()> {
        // Master copies first, and only then slave copies, so a slave
        // never holds repository state that no master has committed.
        let masters = fanout::owned_shards(
            self.sharder.as_ref(),
            self.router.as_ref(),
            Role::Master,
        )
        .await?;
        fanout::apply(&masters, |shard| {
            self.driver.init_repository(repo, shard)
        })
        .await?;
        let slaves = fanout::owned_shards(
            self.sharder.as_ref(),
            self.router.as_ref(),
            Role::Slave,
        )
        .await?;
        fanout::apply(&slaves, |shard| {
            self.driver.init_repository(repo, shard)
        })
        .await?;
        info!(
            repo,
            masters = masters.len(),
            slaves = slaves.len(),
            "initialized repository on owned shards"
        );
        Ok(())
    }

    async fn get_file(&self, path: &str) -> FsResult<ByteStream> {
        let shard = self.sharder.shard_of(path.as_bytes())?;
        match self.delegate(shard).await? {
            Some(remote) => {
                debug!(shard, path, "forwarding get_file to shard owner");
                let stream = remote.get_file(path).await?;
                Ok(relay::pipe(shard, Placement::Forwarded, stream))
            }
            None => {
                let stream = self.driver.get_file(path, shard).await?;
                Ok(relay::pipe(shard, Placement::Local, stream))
            }
        }
    }

    async fn put_file(&self, path: &str, data: ByteStream) -> FsResult<()> {
        let shard = self.sharder.shard_of(path.as_bytes())?;
        match self.delegate(shard).await? {
            Some(remote) => {
                debug!(shard, path, "forwarding put_file to shard owner");
                // The inbound stream crosses the hop unmodified; the
                // payload is never materialized on this node.
                remote.put_file(path, data).await
            }
            None => {
                let piped = relay::pipe(shard, Placement::Local, data);
                self.driver.put_file(path, shard, piped).await
            }
        }
    }

    async fn pull_diff(&self, shard: ShardId) -> FsResult<ByteStream> {
        self.check_shard(shard)?;
        match self.delegate(shard).await? {
            Some(remote) => {
                debug!(shard, "forwarding pull_diff to shard owner");
                let stream = remote.pull_diff(shard).await?;
                Ok(relay::pipe(shard, Placement::Forwarded, stream))
            }
            None => {
                let stream = self.driver.pull_diff(shard).await?;
                Ok(relay::pipe(shard, Placement::Local, stream))
            }
        }
    }

    async fn push_diff(
        &self,
        shard: ShardId,
        diff: ByteStream,
    ) -> FsResult<()> {
        self.check_shard(shard)?;
        match self.delegate(shard).await? {
            Some(remote) => {
                debug!(shard, "forwarding push_diff to shard owner");
                remote.push_diff(shard, diff).await
            }
            None => {
                let piped = relay::pipe(shard, Placement::Local, diff);
                self.driver.push_diff(shard, piped).await
            }
        }
    }
}
