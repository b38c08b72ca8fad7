mod error;
mod traits;

pub use error::{FsError, Placement};
pub use traits::{Driver, FileService, Router, Sharder};

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

/// Shard index in `[0, shard_count)`.
pub type ShardId = u64;

pub type FsResult<T> = Result<T, FsError>;

/// Lazily produced sequence of payload chunks. Chunk boundaries carry no
/// meaning; only the concatenated byte sequence does. An `Err` item ends
/// the stream.
pub type ByteStream = BoxStream<'static, FsResult<Bytes>>;

/// Single-chunk stream, for callers that already hold the whole payload.
pub fn stream_of(bytes: Bytes) -> ByteStream {
    futures_util::stream::once(async move { Ok(bytes) }).boxed()
}

/// Stream with no chunks at all.
pub fn empty_stream() -> ByteStream {
    futures_util::stream::empty().boxed()
}
