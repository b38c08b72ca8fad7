use bytes::Bytes;
use futures_util::StreamExt;
use shardfs_api::{ByteStream, FsError, FsResult, Placement, ShardId};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Bridges a produced byte stream to its consumer through a single-slot
/// channel: a pipe, not a cache. At most one chunk is in flight, which
/// bounds memory regardless of payload size, and the copy task never
/// pulls from the source faster than the consumer drains the channel.
///
/// The copy task owns the source, so the source is dropped on every exit
/// path: end of stream, a source error, or the consumer going away
/// (receiver dropped, e.g. on caller cancellation). The select races the
/// source against `closed()` so a hung-up consumer ends the task even
/// while the source is stalled mid-read.
pub(crate) fn pipe(
    shard: ShardId,
    placement: Placement,
    mut source: ByteStream,
) -> ByteStream {
    let (tx, rx) = mpsc::channel::<FsResult<Bytes>>(1);
    tokio::spawn(async move {
        loop {
            let chunk = tokio::select! {
                biased;
                _ = tx.closed() => {
                    debug!(shard, "relay consumer disconnected");
                    break;
                }
                chunk = source.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            match chunk {
                Ok(bytes) => {
                    if tx.send(Ok(bytes)).await.is_err() {
                        debug!(shard, "relay consumer disconnected");
                        break;
                    }
                }
                Err(err) => {
                    // Abort the outbound stream instead of silently
                    // truncating it. Chunks already delivered stand.
                    let abort = match err {
                        aborted @ FsError::Stream { .. } => aborted,
                        other => FsError::Stream {
                            shard,
                            placement,
                            source: Box::new(other),
                        },
                    };
                    let _ = tx.send(Err(abort)).await;
                    break;
                }
            }
        }
    });
    ReceiverStream::new(rx).boxed()
}
