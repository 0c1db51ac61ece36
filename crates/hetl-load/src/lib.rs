pub mod jsonl;
pub mod loader;
pub mod rejects;
pub mod retry;
pub mod sink;

pub use jsonl::JsonlWarehouse;
pub use loader::{Loader, to_table_row};
pub use rejects::{RejectEntry, RejectsWriter};
pub use retry::{RetryPolicy, with_retries};
pub use sink::{SinkError, TableRow, WarehouseSink};
