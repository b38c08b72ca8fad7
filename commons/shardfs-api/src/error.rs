use std::error::Error;
use std::fmt;

use crate::ShardId;

/// Whether an operation ran against local storage or was forwarded to the
/// node that owns the shard. Carried in errors so callers can tell which
/// side of the hop failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Local,
    Forwarded,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Local => write!(f, "local"),
            Placement::Forwarded => write!(f, "forwarded"),
        }
    }
}

/// The error kinds the coordination layer surfaces to its callers.
///
/// Collaborator failures are wrapped with routing context (which shard,
/// which side of the hop), never swallowed and never converted into an
/// empty success.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    /// The routing key cannot be mapped to a shard. Returned before any
    /// other collaborator is queried.
    #[error("invalid routing key: {0}")]
    InvalidKey(String),

    /// No reachable owner for the shard, or the delegated call to the
    /// owner failed or timed out. The coordination layer never retries;
    /// retrying a non-idempotent write here could duplicate it.
    #[error("shard {shard} unavailable: {reason}")]
    Unavailable { shard: ShardId, reason: String },

    /// A repository-wide operation failed at `shard`. Shards applied
    /// before it are NOT rolled back; retrying the whole operation is
    /// safe only if the per-shard operation is idempotent.
    #[error("repository-wide operation failed at shard {shard}: {source}")]
    PartialFailure {
        shard: ShardId,
        source: Box<FsError>,
    },

    /// A relay source or sink failed mid-stream. The outbound stream is
    /// aborted rather than silently truncated; chunks already delivered
    /// are not retracted.
    #[error("{placement} stream on shard {shard} aborted: {source}")]
    Stream {
        shard: ShardId,
        placement: Placement,
        source: Box<FsError>,
    },

    /// A storage-engine failure, tagged with the shard it happened on.
    #[error("storage error on shard {shard}: {source}")]
    Storage {
        shard: ShardId,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
}

impl FsError {
    pub fn storage<E>(shard: ShardId, source: E) -> FsError
    where
        E: Error + Send + Sync + 'static,
    {
        FsError::Storage {
            shard,
            source: Box::new(source),
        }
    }

    pub fn unavailable(shard: ShardId, reason: impl Into<String>) -> FsError {
        FsError::Unavailable {
            shard,
            reason: reason.into(),
        }
    }
}
