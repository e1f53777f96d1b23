use crate::analysis::error::AnalysisError;
use crate::config::ConfigError;
use crate::provider::error::ProviderError;
use crate::store::error::{PersistenceError, SchemaError};
use crate::sync::error::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherSyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[cfg(feature = "charts")]
    #[error(transparent)]
    Chart(#[from] crate::charts::ChartError),
}
