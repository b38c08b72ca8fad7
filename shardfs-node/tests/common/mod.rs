#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use shardfs_api::{
    ByteStream, Driver, FileService, FsError, FsResult, Router, ShardId,
    Sharder,
};
use shardfs_dev::{MemDriver, ModuloSharder, StaticRouter};
use shardfs_node::Coordinator;

pub async fn collect(mut stream: ByteStream) -> FsResult<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}

/// Finds a path that the sharder maps to `shard`.
pub fn key_for_shard(
    sharder: &dyn Sharder,
    shard: ShardId,
    tag: &str,
) -> String {
    (0u32..)
        .map(|i| format!("{tag}-{i}"))
        .find(|key| sharder.shard_of(key.as_bytes()).unwrap() == shard)
        .unwrap()
}

/// Storage stub recording every call in order, optionally failing
/// repository init on one shard.
pub struct RecordingDriver {
    pub inner: MemDriver,
    calls: Mutex<Vec<(String, ShardId)>>,
    fail_init_on: Option<ShardId>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            inner: MemDriver::new(),
            calls: Mutex::new(Vec::new()),
            fail_init_on: None,
        }
    }

    pub fn failing_init_on(shard: ShardId) -> Self {
        Self {
            fail_init_on: Some(shard),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<(String, ShardId)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, shard: ShardId) {
        self.calls.lock().unwrap().push((op.to_string(), shard));
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn init_repository(
        &self,
        repo: &str,
        shard: ShardId,
    ) -> FsResult<()> {
        self.record("init", shard);
        if self.fail_init_on == Some(shard) {
            return Err(FsError::unavailable(shard, "induced init failure"));
        }
        self.inner.init_repository(repo, shard).await
    }

    async fn get_file(
        &self,
        path: &str,
        shard: ShardId,
    ) -> FsResult<ByteStream> {
        self.record("get", shard);
        self.inner.get_file(path, shard).await
    }

    async fn put_file(
        &self,
        path: &str,
        shard: ShardId,
        data: ByteStream,
    ) -> FsResult<()> {
        self.record("put", shard);
        self.inner.put_file(path, shard, data).await
    }

    async fn pull_diff(&self, shard: ShardId) -> FsResult<ByteStream> {
        self.record("pull_diff", shard);
        self.inner.pull_diff(shard).await
    }

    async fn push_diff(
        &self,
        shard: ShardId,
        diff: ByteStream,
    ) -> FsResult<()> {
        self.record("push_diff", shard);
        self.inner.push_diff(shard, diff).await
    }
}

/// Router wrapper counting every query, to prove what never got asked.
pub struct CountingRouter {
    inner: StaticRouter,
    queries: AtomicUsize,
}

impl CountingRouter {
    pub fn new(inner: StaticRouter) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Router for CountingRouter {
    async fn is_local_master(&self, shard: ShardId) -> FsResult<bool> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.is_local_master(shard).await
    }

    async fn is_local_slave(&self, shard: ShardId) -> FsResult<bool> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.is_local_slave(shard).await
    }

    async fn remote_for(
        &self,
        shard: ShardId,
    ) -> FsResult<Arc<dyn FileService>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.remote_for(shard).await
    }
}

/// Router whose role table can change between calls, to observe that
/// ownership really is re-resolved per request.
pub struct MutableRouter {
    masters: Mutex<HashSet<ShardId>>,
    slaves: Mutex<HashSet<ShardId>>,
}

impl MutableRouter {
    pub fn new(
        masters: impl IntoIterator<Item = ShardId>,
        slaves: impl IntoIterator<Item = ShardId>,
    ) -> Self {
        Self {
            masters: Mutex::new(masters.into_iter().collect()),
            slaves: Mutex::new(slaves.into_iter().collect()),
        }
    }

    pub fn set_roles(
        &self,
        masters: impl IntoIterator<Item = ShardId>,
        slaves: impl IntoIterator<Item = ShardId>,
    ) {
        *self.masters.lock().unwrap() = masters.into_iter().collect();
        *self.slaves.lock().unwrap() = slaves.into_iter().collect();
    }
}

#[async_trait]
impl Router for MutableRouter {
    async fn is_local_master(&self, shard: ShardId) -> FsResult<bool> {
        Ok(self.masters.lock().unwrap().contains(&shard))
    }

    async fn is_local_slave(&self, shard: ShardId) -> FsResult<bool> {
        Ok(self.slaves.lock().unwrap().contains(&shard))
    }

    async fn remote_for(
        &self,
        shard: ShardId,
    ) -> FsResult<Arc<dyn FileService>> {
        Err(FsError::unavailable(shard, "no remotes in this test"))
    }
}

/// Remote-handle wrapper recording which operations crossed the hop.
pub struct RecordingRemote {
    inner: Arc<dyn FileService>,
    calls: Mutex<Vec<String>>,
}

impl RecordingRemote {
    pub fn new(inner: Arc<dyn FileService>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_string());
    }
}

#[async_trait]
impl FileService for RecordingRemote {
    async fn init_repository(&self, repo: &str) -> FsResult<()> {
        self.record("init_repository");
        self.inner.init_repository(repo).await
    }

    async fn get_file(&self, path: &str) -> FsResult<ByteStream> {
        self.record("get_file");
        self.inner.get_file(path).await
    }

    async fn put_file(&self, path: &str, data: ByteStream) -> FsResult<()> {
        self.record("put_file");
        self.inner.put_file(path, data).await
    }

    async fn pull_diff(&self, shard: ShardId) -> FsResult<ByteStream> {
        self.record("pull_diff");
        self.inner.pull_diff(shard).await
    }

    async fn push_diff(
        &self,
        shard: ShardId,
        diff: ByteStream,
    ) -> FsResult<()> {
        self.record("push_diff");
        self.inner.push_diff(shard, diff).await
    }
}

/// Stands in for an owner that exists in the routing table but cannot be
/// reached, the way a transport adapter surfaces a dead peer.
pub struct UnreachableRemote {
    shard: ShardId,
}

impl UnreachableRemote {
    pub fn new(shard: ShardId) -> Self {
        Self { shard }
    }

    fn refused(&self) -> FsError {
        FsError::unavailable(self.shard, "connection refused")
    }
}

#[async_trait]
impl FileService for UnreachableRemote {
    async fn init_repository(&self, _repo: &str) -> FsResult<()> {
        Err(self.refused())
    }

    async fn get_file(&self, _path: &str) -> FsResult<ByteStream> {
        Err(self.refused())
    }

    async fn put_file(&self, _path: &str, _data: ByteStream) -> FsResult<()> {
        Err(self.refused())
    }

    async fn pull_diff(&self, _shard: ShardId) -> FsResult<ByteStream> {
        Err(self.refused())
    }

    async fn push_diff(
        &self,
        _shard: ShardId,
        _diff: ByteStream,
    ) -> FsResult<()> {
        Err(self.refused())
    }
}

/// One hand-assembled node with every collaborator reachable for
/// assertions.
pub struct TestNode {
    pub coordinator: Arc<Coordinator>,
    pub sharder: Arc<ModuloSharder>,
    pub router: Arc<StaticRouter>,
    pub driver: Arc<RecordingDriver>,
}

pub fn build_node(
    shard_count: u64,
    masters: Vec<ShardId>,
    slaves: Vec<ShardId>,
) -> TestNode {
    build_node_with_driver(
        shard_count,
        masters,
        slaves,
        RecordingDriver::new(),
    )
}

pub fn build_node_with_driver(
    shard_count: u64,
    masters: Vec<ShardId>,
    slaves: Vec<ShardId>,
    driver: RecordingDriver,
) -> TestNode {
    let sharder = Arc::new(ModuloSharder::new(shard_count));
    let router = Arc::new(StaticRouter::new(masters, slaves));
    let driver = Arc::new(driver);
    let coordinator = Arc::new(Coordinator::new(
        sharder.clone(),
        router.clone(),
        driver.clone(),
    ));
    TestNode {
        coordinator,
        sharder,
        router,
        driver,
    }
}
