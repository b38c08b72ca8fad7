//! Dev and test implementations of the shardfs collaborator traits, plus
//! an in-process cluster harness. Nothing here is meant for production
//! storage; the point is substitutability: everything above these types
//! only ever sees `Sharder` / `Router` / `Driver` / `FileService`.

mod cluster;
mod conf;
mod driver;
mod router;
mod sharder;

pub use cluster::LocalCluster;
pub use conf::Config;
pub use driver::{CHUNK_SIZE, MemDriver};
pub use router::StaticRouter;
pub use sharder::ModuloSharder;
