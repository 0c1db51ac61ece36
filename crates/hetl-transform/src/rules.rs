//! Schema-driven record normalization.
//!
//! Rules run in schema field order so the output is deterministic and
//! reproducible: defaults first, then clamps, then the run stamp. Clamping
//! retains partially-valid rows; fields with no sensible clamp declare a
//! validator constraint instead and never reach this stage out of range.

use chrono::{DateTime, Utc};
use tracing::trace;

use hetl_model::{EnrichedRecord, FieldValue, Schema, TypedRecord};

/// Apply defaulting, clamping, and the run stamp to an accepted record.
///
/// Pure per record: no cross-record state. Every record of one run carries
/// the same `run_stamp`, which identifies the batch in the warehouse.
pub fn transform(schema: &Schema, record: TypedRecord, run_stamp: DateTime<Utc>) -> EnrichedRecord {
    let mut values = record.values;
    for field in &schema.fields {
        let value = values.entry(field.name.clone()).or_insert(FieldValue::Null);
        if value.is_null() {
            if let Some(default) = &field.default {
                trace!(field = %field.name, "applying default sentinel");
                *value = default.clone();
            }
            continue;
        }
        if let Some((min, max)) = field.clamp {
            clamp_in_place(value, min, max);
        }
    }
    EnrichedRecord {
        line: record.line,
        values,
        created_at: run_stamp,
    }
}

/// Clamp a numeric value to the nearest inclusive bound.
fn clamp_in_place(value: &mut FieldValue, min: i64, max: i64) {
    match value {
        FieldValue::Integer(v) => *v = (*v).clamp(min, max),
        FieldValue::Float(v) => *v = v.clamp(min as f64, max as f64),
        _ => {}
    }
}
