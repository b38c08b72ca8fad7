use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "SHARDFS_NODES", default = "2")]
    pub nodes: u64,
    #[envconfig(from = "SHARDFS_SHARDS", default = "8")]
    pub shards: u64,
    /// Slave copies per shard, held by the nodes after the master.
    #[envconfig(from = "SHARDFS_REPLICAS", default = "1")]
    pub replicas: u64,
}
