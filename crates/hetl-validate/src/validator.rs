//! Schema-driven record validation.
//!
//! Validation is all-fields-checked-then-decide: every violation for a
//! record is collected before the accept/reject decision, so a rejection
//! lists every failing field rather than the first one found.

use std::collections::BTreeMap;

use hetl_model::{
    FieldValue, RawRecord, RecordRule, RejectedRecord, RejectionReason, Schema, TypedRecord,
};

use crate::keys::KeyTracker;

/// Outcome of validating one raw record.
#[derive(Debug)]
pub enum Outcome {
    Accepted(TypedRecord),
    Rejected(RejectedRecord),
}

/// Validates records of one dataset against its schema.
///
/// Owns the per-run key tracker; construct one validator per dataset run
/// and drop it at run end.
pub struct Validator<'a> {
    schema: &'a Schema,
    keys: KeyTracker,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            keys: KeyTracker::new(),
        }
    }

    /// Validate one record. Never mutates the raw input; the only side
    /// effect is the key-uniqueness tracker.
    pub fn validate(&mut self, raw: RawRecord) -> Outcome {
        let mut reasons = Vec::new();
        let mut values: BTreeMap<String, FieldValue> = BTreeMap::new();

        for field in &self.schema.fields {
            let raw_value = raw.value(&field.name);
            if raw_value.is_empty() {
                // A declared default satisfies the non-null obligation via
                // the transformer, so blankness there is not a violation.
                if !field.nullable && field.default.is_none() {
                    reasons.push(RejectionReason::MissingRequiredField {
                        field: field.name.clone(),
                    });
                }
                values.insert(field.name.clone(), FieldValue::Null);
                continue;
            }
            let Some(typed) = field.field_type.coerce(raw_value) else {
                reasons.push(RejectionReason::TypeMismatch {
                    field: field.name.clone(),
                    raw_value: raw_value.to_string(),
                });
                values.insert(field.name.clone(), FieldValue::Null);
                continue;
            };
            for constraint in &field.constraints {
                if !constraint.check(&typed) {
                    reasons.push(RejectionReason::ConstraintViolation {
                        field: field.name.clone(),
                        rule: constraint.rule(),
                    });
                }
            }
            values.insert(field.name.clone(), typed);
        }

        for rule in &self.schema.rules {
            if let Some(reason) = check_rule(rule, &values) {
                reasons.push(reason);
            }
        }

        if let Some(key_field) = &self.schema.primary_key
            && let Some(key) = values.get(key_field).and_then(FieldValue::as_text)
            && let Some(first_line) = self.keys.observe(key, raw.line)
        {
            reasons.push(RejectionReason::DuplicateKey {
                key: key.to_string(),
                first_line,
            });
        }

        if reasons.is_empty() {
            Outcome::Accepted(TypedRecord {
                line: raw.line,
                values,
            })
        } else {
            Outcome::Rejected(RejectedRecord {
                line: raw.line,
                raw: raw.values,
                reasons,
            })
        }
    }
}

fn check_rule(rule: &RecordRule, values: &BTreeMap<String, FieldValue>) -> Option<RejectionReason> {
    match rule {
        RecordRule::DateOrder { earlier, later } => {
            let start = values.get(earlier).and_then(FieldValue::as_datetime)?;
            let end = values.get(later).and_then(FieldValue::as_datetime)?;
            if end < start {
                Some(RejectionReason::ConstraintViolation {
                    field: later.clone(),
                    rule: format!("not_before_{earlier}"),
                })
            } else {
                None
            }
        }
    }
}
