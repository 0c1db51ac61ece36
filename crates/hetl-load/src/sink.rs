//! Warehouse sink abstraction.

use thiserror::Error;

/// One warehouse row: column name to JSON value.
pub type TableRow = serde_json::Map<String, serde_json::Value>;

/// Sink failures, split so the retry layer can discriminate.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Timeout, throttling: worth retrying with backoff.
    #[error("transient sink failure: {0}")]
    Transient(String),
    /// Anything retrying cannot fix.
    #[error("sink failure: {0}")]
    Permanent(String),
}

impl SinkError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SinkError::Transient(_))
    }
}

/// A warehouse that provides atomic table replace/upsert semantics.
///
/// The pipeline relies on the sink's own write semantics for consistency;
/// it does not implement distributed coordination on top.
pub trait WarehouseSink {
    /// Truncate the table and write the batch.
    fn replace(&mut self, table: &str, rows: &[TableRow]) -> Result<(), SinkError>;

    /// Insert-or-update rows by the named key column.
    fn upsert(&mut self, table: &str, key: &str, rows: &[TableRow]) -> Result<(), SinkError>;

    /// Append rows to the table.
    fn append(&mut self, table: &str, rows: &[TableRow]) -> Result<(), SinkError>;

    /// Remove all rows tagged with the given run id.
    fn purge_run(&mut self, table: &str, run_id: &str) -> Result<(), SinkError>;

    /// Current row count of a table; absent tables count zero.
    fn row_count(&self, table: &str) -> Result<usize, SinkError>;
}
