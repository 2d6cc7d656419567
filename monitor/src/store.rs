//! Daily append-only sample log
//!
//! One JSON object per line in `<base>/metrics-<YYYYMMDD>.jsonl`. The file is
//! opened, written and closed on every append so external readers always see
//! whole lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};

use crate::error::{Result, StorageError};
use crate::model::SampleRecord;

/// Appends records to the log for one collection date
#[derive(Debug, Clone)]
pub struct SampleStore {
    base_dir: PathBuf,
    date: NaiveDate,
}

impl SampleStore {
    pub fn new(base_dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            base_dir: base_dir.into(),
            date,
        }
    }

    /// Store bound to the current UTC date
    pub fn for_today(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_dir, Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn log_path(&self) -> PathBuf {
        log_path_for(&self.base_dir, self.date)
    }

    /// Append one record as a single line and return the log path
    pub fn append(&self, record: &SampleRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).map_err(|source| StorageError::DirectoryCreationFailed {
            path: self.base_dir.clone(),
            source,
        })?;

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let path = self.log_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        file.write_all(&line).map_err(|source| StorageError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Appended {} bytes to {}", line.len(), path.display());
        Ok(path)
    }
}

/// Log file name for a collection date
pub fn log_file_name(date: NaiveDate) -> String {
    format!("metrics-{}.jsonl", date.format("%Y%m%d"))
}

/// Full log path for a collection date under `base_dir`
pub fn log_path_for(base_dir: &Path, date: NaiveDate) -> PathBuf {
    base_dir.join(log_file_name(date))
}
