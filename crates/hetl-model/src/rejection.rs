//! Rejection reasons with stable codes for the rejects sink.

use std::fmt;

use serde::Serialize;

/// Why a record failed validation. Serialized into the rejects sink as a
/// tagged object so no detail is lost.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code")]
pub enum RejectionReason {
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField { field: String },
    #[serde(rename = "TYPE_MISMATCH")]
    TypeMismatch { field: String, raw_value: String },
    #[serde(rename = "CONSTRAINT_VIOLATION")]
    ConstraintViolation { field: String, rule: String },
    #[serde(rename = "DUPLICATE_KEY")]
    DuplicateKey { key: String, first_line: u64 },
}

impl RejectionReason {
    /// Stable reason code used for summary breakdowns.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            RejectionReason::TypeMismatch { .. } => "TYPE_MISMATCH",
            RejectionReason::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            RejectionReason::DuplicateKey { .. } => "DUPLICATE_KEY",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingRequiredField { field } => {
                write!(f, "MISSING_REQUIRED_FIELD({field})")
            }
            RejectionReason::TypeMismatch { field, raw_value } => {
                write!(f, "TYPE_MISMATCH({field}, {raw_value:?})")
            }
            RejectionReason::ConstraintViolation { field, rule } => {
                write!(f, "CONSTRAINT_VIOLATION({field}, {rule})")
            }
            RejectionReason::DuplicateKey { key, first_line } => {
                write!(f, "DUPLICATE_KEY({key}, first seen line {first_line})")
            }
        }
    }
}
