use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use shardfs_api::{FsError, FsResult, ShardId, Sharder};

/// Hash-modulo shard assignment. Deterministic within one process, which
/// is all the dev cluster needs; a real deployment plugs a portable hash
/// in through the same trait.
pub struct ModuloSharder {
    shard_count: u64,
}

impl ModuloSharder {
    /// # Panics
    ///
    /// Panics when `shard_count` is zero.
    pub fn new(shard_count: u64) -> Self {
        assert!(shard_count > 0, "shard count must be nonzero");
        Self { shard_count }
    }
}

impl Sharder for ModuloSharder {
    fn shard_of(&self, key: &[u8]) -> FsResult<ShardId> {
        if key.is_empty() {
            return Err(FsError::InvalidKey("empty key".into()));
        }
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Ok(hasher.finish() % self.shard_count)
    }

    fn shard_count(&self) -> u64 {
        self.shard_count
    }
}
