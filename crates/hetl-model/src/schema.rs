//! Dataset schemas: ordered typed fields plus load policy.

use std::fmt;
use std::str::FromStr;

use crate::field::{Constraint, FieldType, FieldValue};

/// The three dataset kinds this pipeline ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    Patients,
    Treatments,
    Analysis,
}

impl Dataset {
    pub fn all() -> [Dataset; 3] {
        [Dataset::Patients, Dataset::Treatments, Dataset::Analysis]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Patients => "patients",
            Dataset::Treatments => "treatments",
            Dataset::Analysis => "analysis",
        }
    }

    /// Conventional source file name for this dataset.
    pub fn source_file(&self) -> &'static str {
        match self {
            Dataset::Patients => "patients.csv",
            Dataset::Treatments => "treatments.csv",
            Dataset::Analysis => "hospital_analysis.csv",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patients" => Ok(Dataset::Patients),
            "treatments" => Ok(Dataset::Treatments),
            "analysis" | "hospital_analysis" => Ok(Dataset::Analysis),
            other => Err(format!("unknown dataset: {other}")),
        }
    }
}

/// How a dataset is written to the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Truncate the table and write the batch. For small reference-style
    /// tables.
    Replace,
    /// Insert-or-update by the declared primary key.
    Upsert,
    /// Append rows tagged with the run id; a re-run purges its own tag first.
    Append,
}

/// One field of a dataset schema.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub constraints: Vec<Constraint>,
    /// Sentinel substituted by the transformer when the value is absent.
    /// A non-nullable field with a default is never rejected for blankness.
    pub default: Option<FieldValue>,
    /// Inclusive bounds the transformer clamps numeric values into.
    pub clamp: Option<(i64, i64)>,
}

impl Field {
    pub fn required(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            nullable: false,
            constraints: Vec::new(),
            default: None,
            clamp: None,
        }
    }

    pub fn nullable(name: &str, field_type: FieldType) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, field_type)
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn clamped(mut self, min: i64, max: i64) -> Self {
        self.clamp = Some((min, max));
        self
    }
}

/// A record-level rule checked after all field-level checks.
#[derive(Debug, Clone)]
pub enum RecordRule {
    /// When both fields are present, `later` must not precede `earlier`.
    DateOrder { earlier: String, later: String },
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub dataset: Dataset,
    /// Warehouse table name.
    pub table: String,
    pub fields: Vec<Field>,
    /// Declared unique key; `None` means no uniqueness is enforced.
    pub primary_key: Option<String>,
    pub rules: Vec<RecordRule>,
    pub load_policy: LoadPolicy,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_round_trips_through_str() {
        for dataset in Dataset::all() {
            assert_eq!(dataset.as_str().parse::<Dataset>().unwrap(), dataset);
        }
        assert_eq!(
            "hospital_analysis".parse::<Dataset>().unwrap(),
            Dataset::Analysis
        );
        assert!("icu".parse::<Dataset>().is_err());
    }

    #[test]
    fn field_builders_compose() {
        let field = Field::required("satisfaction", FieldType::Integer)
            .with_default(FieldValue::Integer(3))
            .clamped(1, 5);
        assert!(!field.nullable);
        assert_eq!(field.default, Some(FieldValue::Integer(3)));
        assert_eq!(field.clamp, Some((1, 5)));
    }
}
