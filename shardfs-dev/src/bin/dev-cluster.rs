use std::error::Error;

use bytes::Bytes;
use envconfig::Envconfig;
use futures_util::StreamExt;
use shardfs_api::{FileService, stream_of};
use shardfs_dev::{Config, LocalCluster};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_log();
    let conf = Config::init_from_env()?;
    info!(?conf, "starting in-process cluster");
    let cluster = LocalCluster::new(&conf).await;

    let node = cluster.node(0);
    node.init_repository("scratch").await?;
    for i in 0..8u8 {
        let path = format!("dir/file-{i}.bin");
        let payload = Bytes::from(vec![i; 1024]);
        node.put_file(&path, stream_of(payload)).await?;
        let mut stream = node.get_file(&path).await?;
        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            total += chunk?.len();
        }
        info!(path, bytes = total, "round trip through the cluster");
    }
    info!("dev cluster workload complete");
    Ok(())
}

fn init_log() {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{
        EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("SHARDFS_LOG")
                .from_env_lossy(),
        )
        .init();
}
