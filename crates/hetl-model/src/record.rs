//! Record shapes across the pipeline stages.
//!
//! A record is created raw by the extractor, reclassified by the validator,
//! enriched by the transformer, and terminally persisted or reported. No
//! shape is mutated after the stage that produces it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::field::FieldValue;
use crate::rejection::RejectionReason;

/// An unvalidated record: raw strings keyed by header name, with the
/// 1-based source line for error reporting.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub line: u64,
    pub values: BTreeMap<String, String>,
}

impl RawRecord {
    /// Raw value for a field, trimmed; absent columns read as blank.
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(|v| v.trim()).unwrap_or("")
    }
}

/// A record that passed validation, carrying strongly-typed values.
#[derive(Debug, Clone)]
pub struct TypedRecord {
    pub line: u64,
    pub values: BTreeMap<String, FieldValue>,
}

impl TypedRecord {
    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Null)
    }
}

/// A transformed record ready for loading. `created_at` is identical across
/// all records of one run.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub line: u64,
    pub values: BTreeMap<String, FieldValue>,
    pub created_at: DateTime<Utc>,
}

impl EnrichedRecord {
    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Null)
    }
}

/// A record that failed validation: the original raw values plus every
/// violation found, never just the first.
#[derive(Debug, Clone)]
pub struct RejectedRecord {
    pub line: u64,
    pub raw: BTreeMap<String, String>,
    pub reasons: Vec<RejectionReason>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_is_trimmed_and_blank_when_absent() {
        let mut values = BTreeMap::new();
        values.insert("gender".to_string(), "  F  ".to_string());
        let record = RawRecord { line: 2, values };
        assert_eq!(record.value("gender"), "F");
        assert_eq!(record.value("missing"), "");
    }
}
