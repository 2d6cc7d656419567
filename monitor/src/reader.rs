//! Sequential reader for a daily sample log
//!
//! Records are decoded lazily, one per non-blank line. The first malformed
//! line ends the read with [`ParseError::MalformedRecord`].

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Take};
use std::path::{Path, PathBuf};

use crate::error::{ParseError, Result, StorageError};
use crate::model::SampleRecord;

/// Lazy iterator over the records of one log file.
///
/// The reader is bounded to the file length observed at open, so lines
/// appended by a concurrent collector afterwards are not seen. A trailing
/// fragment without a newline that ends mid-record is treated as an append
/// in progress and skipped; any other undecodable line is malformed, even
/// bytes that are not UTF-8.
pub struct RecordReader {
    path: PathBuf,
    lines: BufReader<Take<File>>,
    line_number: usize,
    finished: bool,
}

impl RecordReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let read_failed = |source| StorageError::ReadFailed {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(read_failed)?;
        let len = file.metadata().map_err(read_failed)?.len();

        Ok(Self {
            lines: BufReader::new(file.take(len)),
            path,
            line_number: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_record(&mut self) -> Option<Result<SampleRecord>> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = match self.lines.read_until(b'\n', &mut buf) {
                Ok(read) => read,
                Err(source) => {
                    return Some(Err(StorageError::ReadFailed {
                        path: self.path.clone(),
                        source,
                    }
                    .into()))
                }
            };
            if read == 0 {
                return None;
            }
            self.line_number += 1;

            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return match serde_json::from_slice::<SampleRecord>(&buf) {
                Ok(record) => Some(Ok(record)),
                // Only a cut-off record counts as an append in progress
                Err(e) if e.is_eof() && !buf.ends_with(b"\n") => {
                    tracing::warn!(
                        "Skipping incomplete trailing line {} in {}",
                        self.line_number,
                        self.path.display()
                    );
                    None
                }
                Err(e) => Some(Err(ParseError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.line_number,
                    reason: e.to_string(),
                }
                .into())),
            };
        }
    }
}

impl Iterator for RecordReader {
    type Item = Result<SampleRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = self.next_record();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

/// Read every record of a log, stopping at the first malformed line
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<SampleRecord>> {
    RecordReader::open(path)?.collect()
}
