use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// The persisted file exists but cannot be read as a dataset.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to access dataset file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse dataset file '{0}' as CSV")]
    Unreadable(PathBuf, #[source] PolarsError),

    #[error("Header of '{path}' does not match the expected columns: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Failed to read column '{column}' of '{path}'")]
    Column {
        path: PathBuf,
        column: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Missing value in required column '{column}' at row {row} of '{path}'")]
    MissingValue {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    #[error("Invalid value '{value}' in column '{column}' at row {row} of '{path}'")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Writing the dataset failed. The previously persisted file is left untouched.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to create temporary file in '{0}'")]
    TempFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to build frame for dataset file '{0}'")]
    Frame(PathBuf, #[source] PolarsError),

    #[error("Encoding error writing dataset file '{0}'")]
    Encode(PathBuf, #[source] PolarsError),

    #[error("I/O error writing dataset file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to replace dataset file '{0}'")]
    Replace(PathBuf, #[source] std::io::Error),
}
