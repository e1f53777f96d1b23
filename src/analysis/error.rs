use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to resolve date or period")]
    DateParsing,

    #[error("Frame computation failed")]
    Polars(#[from] PolarsError),
}
