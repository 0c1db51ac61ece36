//! Field types, typed values, and declared constraints.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Logical type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Date,
    DateTime,
}

impl FieldType {
    /// Coerce a raw non-empty string into a typed value.
    ///
    /// Returns `None` when the raw value cannot be represented in this type;
    /// the caller turns that into a `TypeMismatch` rejection. Non-finite
    /// floats (`inf`, `NaN`) are not representable in the warehouse and do
    /// not coerce.
    pub fn coerce(&self, raw: &str) -> Option<FieldValue> {
        let trimmed = raw.trim();
        match self {
            FieldType::Text => Some(FieldValue::Text(trimmed.to_string())),
            FieldType::Integer => trimmed.parse::<i64>().ok().map(FieldValue::Integer),
            FieldType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Float),
            FieldType::Date => parse_date(trimmed).map(FieldValue::Date),
            FieldType::DateTime => parse_datetime(trimmed).map(FieldValue::DateTime),
        }
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse a datetime, accepting `T` or space separators, with or without
/// seconds; a bare date is taken as midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    parse_date(trimmed).map(|date| date.and_time(NaiveTime::MIN))
}

/// A typed cell value after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => write!(f, "{value}"),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Float(value) => write!(f, "{value}"),
            FieldValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            FieldValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S")),
            FieldValue::Null => Ok(()),
        }
    }
}

/// A declared range/sign constraint on a numeric field.
///
/// Constraints are validator-enforced: a violating value is rejected, never
/// adjusted. Fields where the business rules prefer retention over rejection
/// declare clamp bounds on the schema field instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NonNegative,
    Range { min: i64, max: i64 },
}

impl Constraint {
    /// Stable rule identifier used in rejection reasons.
    pub fn rule(&self) -> String {
        match self {
            Constraint::NonNegative => "non_negative".to_string(),
            Constraint::Range { min, max } => format!("range {min}..={max}"),
        }
    }

    /// Check a typed value against this constraint. Null values pass;
    /// nullability is checked separately.
    pub fn check(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Constraint::NonNegative, FieldValue::Integer(v)) => *v >= 0,
            (Constraint::NonNegative, FieldValue::Float(v)) => *v >= 0.0,
            (Constraint::Range { min, max }, FieldValue::Integer(v)) => *v >= *min && *v <= *max,
            (Constraint::Range { min, max }, FieldValue::Float(v)) => {
                *v >= *min as f64 && *v <= *max as f64
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_integer() {
        assert_eq!(
            FieldType::Integer.coerce("42"),
            Some(FieldValue::Integer(42))
        );
        assert_eq!(FieldType::Integer.coerce("42.5"), None);
        assert_eq!(FieldType::Integer.coerce("abc"), None);
    }

    #[test]
    fn coerce_float_rejects_non_finite() {
        assert_eq!(
            FieldType::Float.coerce("12.5"),
            Some(FieldValue::Float(12.5))
        );
        assert_eq!(FieldType::Float.coerce("inf"), None);
        assert_eq!(FieldType::Float.coerce("-Infinity"), None);
        assert_eq!(FieldType::Float.coerce("NaN"), None);
    }

    #[test]
    fn coerce_datetime_accepts_common_separators() {
        assert!(FieldType::DateTime.coerce("2024-03-01T08:30:00").is_some());
        assert!(FieldType::DateTime.coerce("2024-03-01 08:30:00").is_some());
        assert!(FieldType::DateTime.coerce("2024-03-01").is_some());
        assert!(FieldType::DateTime.coerce("01/03/2024").is_none());
    }

    #[test]
    fn constraint_checks() {
        assert!(Constraint::NonNegative.check(&FieldValue::Float(0.0)));
        assert!(!Constraint::NonNegative.check(&FieldValue::Float(-5.0)));
        let range = Constraint::Range { min: 0, max: 130 };
        assert!(range.check(&FieldValue::Integer(130)));
        assert!(!range.check(&FieldValue::Integer(131)));
        // Nulls pass; nullability is a separate check.
        assert!(range.check(&FieldValue::Null));
    }

    #[test]
    fn rule_identifiers_are_stable() {
        assert_eq!(Constraint::NonNegative.rule(), "non_negative");
        assert_eq!(Constraint::Range { min: 1, max: 5 }.rule(), "range 1..=5");
    }
}
