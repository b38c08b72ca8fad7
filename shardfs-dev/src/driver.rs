use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use shardfs_api::{ByteStream, Driver, FsError, FsResult, ShardId};
use tokio::sync::RwLock;

/// Chunk size used when streaming stored files back out.
pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
#[error("no such file: {0}")]
struct NoSuchFile(String);

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ShardState {
    repos: HashSet<String>,
    files: HashMap<String, Vec<u8>>,
}

/// In-memory storage engine, one state blob per shard.
///
/// Diffs are bincode snapshots of the shard state; everything above the
/// driver treats them as opaque bytes, and applying a diff catches the
/// receiving copy up to the producing one.
#[derive(Default)]
pub struct MemDriver {
    shards: RwLock<HashMap<ShardId, ShardState>>,
}

impl MemDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct peek at a stored file, for assertions in tests.
    pub async fn file(&self, shard: ShardId, path: &str) -> Option<Vec<u8>> {
        let shards = self.shards.read().await;
        shards
            .get(&shard)
            .and_then(|state| state.files.get(path).cloned())
    }

    pub async fn has_repository(&self, shard: ShardId, repo: &str) -> bool {
        let shards = self.shards.read().await;
        shards
            .get(&shard)
            .map(|state| state.repos.contains(repo))
            .unwrap_or(false)
    }

    pub async fn file_count(&self, shard: ShardId) -> usize {
        let shards = self.shards.read().await;
        shards.get(&shard).map(|state| state.files.len()).unwrap_or(0)
    }

    async fn drain(mut data: ByteStream) -> FsResult<Vec<u8>> {
        let mut buf = Vec::new();
        while let Some(chunk) = data.next().await {
            let chunk = chunk?;
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}

#[async_trait]
impl Driver for MemDriver {
    async fn init_repository(
        &self,
        repo: &str,
        shard: ShardId,
    ) -> FsResult<()> {
        let mut shards = self.shards.write().await;
        // Re-initializing is a no-op, which keeps repository-wide
        // retries safe after a partial failure.
        shards.entry(shard).or_default().repos.insert(repo.to_string());
        Ok(())
    }

    async fn get_file(
        &self,
        path: &str,
        shard: ShardId,
    ) -> FsResult<ByteStream> {
        let shards = self.shards.read().await;
        let data = shards
            .get(&shard)
            .and_then(|state| state.files.get(path))
            .cloned()
            .ok_or_else(|| {
                FsError::storage(shard, NoSuchFile(path.to_string()))
            })?;
        let chunks: Vec<FsResult<Bytes>> = data
            .chunks(CHUNK_SIZE)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(tokio_stream::iter(chunks).boxed())
    }

    async fn put_file(
        &self,
        path: &str,
        shard: ShardId,
        data: ByteStream,
    ) -> FsResult<()> {
        // Materializing is the storage engine's call to make; the
        // coordination layer above only ever saw the stream. A failed
        // inbound stream leaves the previous file content untouched.
        let buf = Self::drain(data).await?;
        let mut shards = self.shards.write().await;
        shards.entry(shard).or_default().files.insert(path.to_string(), buf);
        Ok(())
    }

    async fn pull_diff(&self, shard: ShardId) -> FsResult<ByteStream> {
        let state = {
            let shards = self.shards.read().await;
            shards.get(&shard).cloned().unwrap_or_default()
        };
        let encoded =
            bincode::serde::encode_to_vec(&state, bincode::config::standard())
                .map_err(|err| FsError::storage(shard, err))?;
        Ok(shardfs_api::stream_of(Bytes::from(encoded)))
    }

    async fn push_diff(
        &self,
        shard: ShardId,
        diff: ByteStream,
    ) -> FsResult<()> {
        let buf = Self::drain(diff).await?;
        let (incoming, _): (ShardState, usize) =
            bincode::serde::decode_from_slice(
                &buf,
                bincode::config::standard(),
            )
            .map_err(|err| FsError::storage(shard, err))?;
        let mut shards = self.shards.write().await;
        let state = shards.entry(shard).or_default();
        state.repos.extend(incoming.repos);
        state.files.extend(incoming.files);
        Ok(())
    }
}
