use crate::store::error::{PersistenceError, SchemaError};
use crate::store::schema::{dataset_to_frame, frame_to_records};
use crate::types::daily_record::DailyRecord;
use crate::types::dataset::Dataset;
use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Returns the latest date in `dataset`, or `None` when it is empty.
pub fn last_recorded_date(dataset: &Dataset) -> Option<NaiveDate> {
    dataset.last_recorded_date()
}

/// Inserts `new_records` into a copy of `dataset`; records sharing a date with an
/// existing one replace it. The input dataset is not modified.
pub fn merge(dataset: &Dataset, new_records: impl IntoIterator<Item = DailyRecord>) -> Dataset {
    dataset.merged_with(new_records)
}

/// Owns the CSV file the dataset is persisted to. The only writer of that file.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted dataset. A missing file yields an empty dataset.
    pub fn load(&self) -> Result<Dataset, SchemaError> {
        let exists = self
            .path
            .try_exists()
            .map_err(|e| SchemaError::Io(self.path.clone(), e))?;
        if !exists {
            info!(
                "No dataset at {:?} yet, starting from an empty dataset",
                self.path
            );
            return Ok(Dataset::new());
        }

        // Every column as a string; typing happens in `frame_to_records`.
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .map_err(|e| SchemaError::Unreadable(self.path.clone(), e))?
            .finish()
            .map_err(|e| SchemaError::Unreadable(self.path.clone(), e))?;

        let records = frame_to_records(&df, &self.path)?;
        let row_count = records.len();
        let in_order = records.windows(2).all(|pair| pair[0].date < pair[1].date);
        let dataset = Dataset::from_records(records);
        if !in_order {
            warn!(
                "Dataset {:?} had unsorted or duplicate dates; normalized {} rows to {} records",
                self.path,
                row_count,
                dataset.len()
            );
        }
        info!("Loaded {} records from {:?}", dataset.len(), self.path);
        Ok(dataset)
    }

    /// Writes `dataset` to a temporary file next to the target without touching the target.
    /// Call [`StagedDataset::commit`] to swap it into place.
    pub fn stage(&self, dataset: &Dataset) -> Result<StagedDataset, PersistenceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp_file =
            NamedTempFile::new_in(&dir).map_err(|e| PersistenceError::TempFile(dir.clone(), e))?;

        let mut df =
            dataset_to_frame(dataset).map_err(|e| PersistenceError::Frame(self.path.clone(), e))?;
        CsvWriter::new(temp_file.as_file_mut())
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| PersistenceError::Encode(self.path.clone(), e))?;
        temp_file
            .flush()
            .map_err(|e| PersistenceError::Io(self.path.clone(), e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| PersistenceError::Io(self.path.clone(), e))?;

        Ok(StagedDataset {
            temp_file,
            target: self.path.clone(),
            records: dataset.len(),
        })
    }

    /// Replaces the persisted file with `dataset`. On failure the previous file is left as it was.
    pub fn save(&self, dataset: &Dataset) -> Result<(), PersistenceError> {
        self.stage(dataset)?.commit()
    }
}

/// A fully written dataset waiting to replace the persisted file.
///
/// Dropping it without calling [`StagedDataset::commit`] removes the temporary file.
#[derive(Debug)]
pub struct StagedDataset {
    temp_file: NamedTempFile,
    target: PathBuf,
    records: usize,
}

impl StagedDataset {
    pub fn temp_path(&self) -> &Path {
        self.temp_file.path()
    }

    /// Atomically renames the staged file over the target.
    pub fn commit(self) -> Result<(), PersistenceError> {
        let StagedDataset {
            temp_file,
            target,
            records,
        } = self;
        temp_file
            .persist(&target)
            .map_err(|e| PersistenceError::Replace(target.clone(), e.error))?;
        info!("Saved {} records to {:?}", records, target);
        Ok(())
    }
}
