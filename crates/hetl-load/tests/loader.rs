//! Loader integration tests: retry behavior and idempotence.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use hetl_load::{
    JsonlWarehouse, Loader, RetryPolicy, SinkError, TableRow, WarehouseSink,
};
use hetl_model::{Dataset, EnrichedRecord, EtlError, FieldValue, LoadPolicy, Schema, schema_of};

/// In-memory sink that fails a configured number of leading calls.
#[derive(Default)]
struct FlakySink {
    failures_left: u32,
    calls: u32,
    tables: HashMap<String, Vec<TableRow>>,
}

impl FlakySink {
    fn failing(times: u32) -> Self {
        Self {
            failures_left: times,
            ..Self::default()
        }
    }

    fn gate(&mut self) -> Result<(), SinkError> {
        self.calls += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            Err(SinkError::Transient("deadline exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

impl WarehouseSink for FlakySink {
    fn replace(&mut self, table: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        self.gate()?;
        self.tables.insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn upsert(&mut self, table: &str, key: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        self.gate()?;
        let existing = self.tables.entry(table.to_string()).or_default();
        for row in rows {
            let key_value = row.get(key).cloned();
            match existing.iter_mut().find(|r| r.get(key) == key_value.as_ref()) {
                Some(slot) => *slot = row.clone(),
                None => existing.push(row.clone()),
            }
        }
        Ok(())
    }

    fn append(&mut self, table: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        self.gate()?;
        self.tables
            .entry(table.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }

    fn purge_run(&mut self, table: &str, run_id: &str) -> Result<(), SinkError> {
        if let Some(rows) = self.tables.get_mut(table) {
            rows.retain(|row| row.get("run_id").and_then(|v| v.as_str()) != Some(run_id));
        }
        Ok(())
    }

    fn row_count(&self, table: &str) -> Result<usize, SinkError> {
        Ok(self.tables.get(table).map_or(0, Vec::len))
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(1),
    }
}

fn enriched(dataset: Dataset, key_field: &str, key: &str) -> EnrichedRecord {
    let schema = schema_of(dataset);
    let mut values = BTreeMap::new();
    for field in &schema.fields {
        values.insert(field.name.clone(), FieldValue::Null);
    }
    values.insert(key_field.to_string(), FieldValue::Text(key.to_string()));
    EnrichedRecord {
        line: 2,
        values,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn transient_failures_are_retried_until_success() {
    let mut sink = FlakySink::failing(2);
    let records = vec![enriched(Dataset::Analysis, "patient_id", "P001")];

    let report = Loader::new(&mut sink)
        .with_retry(fast_retry())
        .load(schema_of(Dataset::Analysis), "run-1", &records, 0)
        .unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(sink.calls, 3);
    assert_eq!(sink.row_count("hospital_analysis").unwrap(), 1);
    // Duration covers the retries, which slept at least twice.
    assert!(report.duration >= Duration::from_millis(2));
}

#[test]
fn exhausted_retries_surface_load_failed() {
    let mut sink = FlakySink::failing(10);
    let records = vec![enriched(Dataset::Analysis, "patient_id", "P001")];

    let error = Loader::new(&mut sink)
        .with_retry(fast_retry())
        .load(schema_of(Dataset::Analysis), "run-1", &records, 0)
        .unwrap_err();

    assert!(matches!(
        error,
        EtlError::LoadFailed { dataset, attempts: 4, .. } if dataset == "analysis"
    ));
    assert_eq!(sink.calls, 4);
}

#[test]
fn upsert_load_is_idempotent_across_reruns() {
    let dir = tempfile::tempdir().unwrap();
    let mut warehouse = JsonlWarehouse::new(dir.path()).unwrap();
    let schema = schema_of(Dataset::Patients);
    let records = vec![
        enriched(Dataset::Patients, "patient_id", "P001"),
        enriched(Dataset::Patients, "patient_id", "P002"),
    ];

    for _ in 0..2 {
        Loader::new(&mut warehouse)
            .load(schema, "run-1", &records, 0)
            .unwrap();
    }

    assert_eq!(warehouse.row_count("patients").unwrap(), 2);
}

#[test]
fn append_load_purges_its_own_run_tag_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut warehouse = JsonlWarehouse::new(dir.path()).unwrap();
    let schema = schema_of(Dataset::Analysis);
    let records = vec![
        enriched(Dataset::Analysis, "patient_id", "P001"),
        enriched(Dataset::Analysis, "patient_id", "P001"),
    ];

    for _ in 0..2 {
        Loader::new(&mut warehouse)
            .load(schema, "run-1", &records, 0)
            .unwrap();
    }
    // A different run id appends alongside, not over.
    Loader::new(&mut warehouse)
        .load(schema, "run-2", &records, 0)
        .unwrap();

    assert_eq!(warehouse.row_count("hospital_analysis").unwrap(), 4);
}

#[test]
fn upsert_without_a_declared_key_is_an_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let mut warehouse = JsonlWarehouse::new(dir.path()).unwrap();
    // A caller-built schema can omit the key; the loader must refuse it.
    let schema = Schema {
        dataset: Dataset::Patients,
        table: "patients".to_string(),
        fields: Vec::new(),
        primary_key: None,
        rules: Vec::new(),
        load_policy: LoadPolicy::Upsert,
    };

    let error = Loader::new(&mut warehouse)
        .load(&schema, "run-1", &[], 0)
        .unwrap_err();

    assert!(matches!(error, EtlError::LoadFailed { attempts: 0, .. }));
    assert_eq!(warehouse.row_count("patients").unwrap(), 0);
}

#[test]
fn empty_batch_loads_vacuously() {
    let dir = tempfile::tempdir().unwrap();
    let mut warehouse = JsonlWarehouse::new(dir.path()).unwrap();

    let report = Loader::new(&mut warehouse)
        .load(schema_of(Dataset::Analysis), "run-1", &[], 0)
        .unwrap();

    assert_eq!(report.accepted, 0);
    assert_eq!(warehouse.row_count("hospital_analysis").unwrap(), 0);
}
