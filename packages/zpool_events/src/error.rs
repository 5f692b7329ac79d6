use thiserror::Error;

/// Errors surfaced by history fetches and historical queries.
///
/// Nothing here is fatal to a running watcher: during steady-state polling a
/// fetch failure is logged and the pool is retried on the next tick. Queries
/// propagate these to the caller instead.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to run history command: {0}")]
    Io(#[from] std::io::Error),

    /// The history command ran but exited non-zero (unknown pool, missing
    /// privileges, ...).
    #[error("history command failed for pool {pool}: {detail}")]
    CommandFailed { pool: String, detail: String },

    /// A since-event query scanned every configured pool without finding the
    /// marker command.
    #[error("event '{0}' not found in history")]
    MarkerNotFound(String),
}

pub type Result<T> = std::result::Result<T, WatchError>;
