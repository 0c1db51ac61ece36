//! Warehouse loading with per-schema policy and bounded retry.

use std::time::Instant;

use chrono::SecondsFormat;
use serde_json::{Value, json};
use tracing::info;

use hetl_model::{EnrichedRecord, EtlError, FieldValue, LoadPolicy, LoadReport, Schema};

use crate::retry::{RetryPolicy, with_retries};
use crate::sink::{TableRow, WarehouseSink};

/// Loads transformed batches into a warehouse sink.
pub struct Loader<'a, S: WarehouseSink> {
    sink: &'a mut S,
    retry: RetryPolicy,
}

impl<'a, S: WarehouseSink> Loader<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Write one dataset's accepted batch.
    ///
    /// Idempotent per run: upsert datasets converge by key, append datasets
    /// purge their own run tag first. An empty batch still performs the
    /// (vacuous) load. The reported duration covers retries.
    pub fn load(
        &mut self,
        schema: &Schema,
        run_id: &str,
        accepted: &[EnrichedRecord],
        rejected: usize,
    ) -> Result<LoadReport, EtlError> {
        let rows: Vec<TableRow> = accepted
            .iter()
            .map(|record| to_table_row(schema, record, run_id))
            .collect();
        let table = schema.table.as_str();
        let started = Instant::now();

        let result = match schema.load_policy {
            LoadPolicy::Replace => with_retries(self.retry, || self.sink.replace(table, &rows)),
            LoadPolicy::Upsert => {
                let Some(key) = schema.primary_key.as_deref() else {
                    return Err(EtlError::LoadFailed {
                        dataset: schema.dataset.to_string(),
                        attempts: 0,
                        message: "upsert policy requires a declared primary key".to_string(),
                    });
                };
                with_retries(self.retry, || self.sink.upsert(table, key, &rows))
            }
            LoadPolicy::Append => with_retries(self.retry, || {
                self.sink.purge_run(table, run_id)?;
                self.sink.append(table, &rows)
            }),
        };
        let duration = started.elapsed();

        match result {
            Ok(()) => {
                info!(
                    dataset = %schema.dataset,
                    table,
                    rows = rows.len(),
                    duration_ms = duration.as_millis() as u64,
                    "loaded batch"
                );
                Ok(LoadReport {
                    accepted: accepted.len(),
                    rejected,
                    duration,
                })
            }
            Err(error) => Err(EtlError::LoadFailed {
                dataset: schema.dataset.to_string(),
                attempts: self.retry.max_attempts,
                message: error.to_string(),
            }),
        }
    }
}

/// Project an enriched record onto warehouse columns: the schema fields in
/// order, plus `created_at` and the `run_id` idempotency tag.
pub fn to_table_row(schema: &Schema, record: &EnrichedRecord, run_id: &str) -> TableRow {
    let mut row = TableRow::new();
    for field in &schema.fields {
        row.insert(field.name.clone(), value_to_json(record.value(&field.name)));
    }
    row.insert(
        "created_at".to_string(),
        json!(record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    row.insert("run_id".to_string(), json!(run_id));
    row
}

fn value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(v) => json!(v),
        FieldValue::Integer(v) => json!(v),
        FieldValue::Float(v) => json!(v),
        FieldValue::Date(v) => json!(v.format("%Y-%m-%d").to_string()),
        FieldValue::DateTime(v) => json!(v.format("%Y-%m-%dT%H:%M:%S").to_string()),
        FieldValue::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    use hetl_model::{Dataset, schema_of};

    #[test]
    fn table_row_carries_every_column_plus_tags() {
        let schema = schema_of(Dataset::Patients);
        let mut values = BTreeMap::new();
        values.insert(
            "patient_id".to_string(),
            FieldValue::Text("P001".to_string()),
        );
        let record = EnrichedRecord {
            line: 2,
            values,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        };

        let row = to_table_row(schema, &record, "run-1");

        for field in &schema.fields {
            assert!(row.contains_key(&field.name), "missing {}", field.name);
        }
        assert_eq!(row["patient_id"], "P001");
        assert_eq!(row["diagnosis"], Value::Null);
        assert_eq!(row["created_at"], "2024-06-01T12:00:00Z");
        assert_eq!(row["run_id"], "run-1");
    }
}
