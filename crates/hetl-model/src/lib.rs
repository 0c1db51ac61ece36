pub mod error;
pub mod field;
pub mod record;
pub mod registry;
pub mod rejection;
pub mod schema;
pub mod summary;

pub use error::{EtlError, Result};
pub use field::{Constraint, FieldType, FieldValue, parse_date, parse_datetime};
pub use record::{EnrichedRecord, RawRecord, RejectedRecord, TypedRecord};
pub use registry::{schema_for, schema_of};
pub use rejection::RejectionReason;
pub use schema::{Dataset, Field, LoadPolicy, RecordRule, Schema};
pub use summary::{DatasetSummary, LoadReport, RunStatus, RunSummary};
