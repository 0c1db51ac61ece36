//! Streaming CSV extraction.
//!
//! `extract` opens one dataset source and returns a lazy, single-pass
//! iterator of raw records. Nothing is materialized: large files stream
//! record at a time. Re-extraction requires calling `extract` again.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use tracing::debug;

use hetl_model::{EtlError, RawRecord, Result, Schema};

/// Strip a UTF-8 byte-order mark and surrounding whitespace.
fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// A lazy stream of raw records from one CSV source.
///
/// Yields `Err(EtlError::CorruptSource)` once and then terminates when the
/// delimited structure is malformed mid-file; corruption is not retried.
pub struct RecordStream {
    dataset: String,
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<File>,
    poisoned: bool,
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("dataset", &self.dataset)
            .field("headers", &self.headers)
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}

impl RecordStream {
    /// Header names as found in the source, BOM-stripped and trimmed.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for RecordStream {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(error) => {
                    self.poisoned = true;
                    let line = error
                        .position()
                        .map(csv::Position::line)
                        .unwrap_or_default();
                    return Some(Err(EtlError::CorruptSource {
                        dataset: self.dataset.clone(),
                        line,
                        message: error.to_string(),
                    }));
                }
            };
            let line = record.position().map(csv::Position::line).unwrap_or(0);
            let mut values = BTreeMap::new();
            let mut all_blank = true;
            for (header, cell) in self.headers.iter().zip(record.iter()) {
                let value = normalize_cell(cell);
                if !value.is_empty() {
                    all_blank = false;
                }
                values.insert(header.clone(), value.to_string());
            }
            if all_blank {
                // Trailing blank lines are skipped, not emitted.
                continue;
            }
            return Some(Ok(RawRecord { line, values }));
        }
    }
}

/// Open a dataset source and return its record stream.
///
/// The source must have a header row. An unopenable source is fatal for
/// this dataset's run only.
pub fn extract(schema: &Schema, path: &Path) -> Result<RecordStream> {
    let dataset = schema.dataset.to_string();
    let file = File::open(path).map_err(|source| EtlError::SourceUnavailable {
        dataset: dataset.clone(),
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);
    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers
            .iter()
            .map(|header| normalize_cell(header).to_string())
            .collect(),
        Err(error) => {
            return Err(EtlError::CorruptSource {
                dataset,
                line: 1,
                message: error.to_string(),
            });
        }
    };
    debug!(dataset, path = %path.display(), columns = headers.len(), "opened source");
    Ok(RecordStream {
        dataset,
        headers,
        records: reader.into_records(),
        poisoned: false,
    })
}
