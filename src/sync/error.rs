use crate::store::error::{PersistenceError, SchemaError};
use thiserror::Error;

/// Failures that abort a run. Per-window provider failures never show up here; they are
/// collected in the [`SyncReport`](crate::sync::report::SyncReport) instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Synchronization cancelled before the dataset was saved")]
    Cancelled,

    // load and save run on the blocking pool
    #[error("Background dataset task failed")]
    TaskJoin(#[from] tokio::task::JoinError),
}
