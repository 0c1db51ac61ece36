//! Static schema registry, built once at first use.

use std::sync::LazyLock;

use crate::error::{EtlError, Result};
use crate::field::{Constraint, FieldType, FieldValue};
use crate::schema::{Dataset, Field, LoadPolicy, RecordRule, Schema};

static SCHEMAS: LazyLock<Vec<Schema>> =
    LazyLock::new(|| vec![patients_schema(), treatments_schema(), analysis_schema()]);

/// Look up the schema for a dataset name.
pub fn schema_for(dataset: &str) -> Result<&'static Schema> {
    let parsed: Dataset = dataset
        .parse()
        .map_err(|_| EtlError::UnknownDataset(dataset.to_string()))?;
    Ok(schema_of(parsed))
}

/// Look up the schema for a known dataset.
pub fn schema_of(dataset: Dataset) -> &'static Schema {
    SCHEMAS
        .iter()
        .find(|schema| schema.dataset == dataset)
        .unwrap_or_else(|| unreachable!("registry covers every Dataset variant"))
}

fn patients_schema() -> Schema {
    Schema {
        dataset: Dataset::Patients,
        table: "patients".to_string(),
        fields: vec![
            Field::required("patient_id", FieldType::Text),
            Field::required("first_name", FieldType::Text),
            Field::required("last_name", FieldType::Text),
            Field::nullable("date_of_birth", FieldType::Date),
            Field::nullable("gender", FieldType::Text)
                .with_default(FieldValue::Text("Unknown".to_string())),
            Field::nullable("admission_date", FieldType::DateTime),
            Field::nullable("discharge_date", FieldType::DateTime),
            Field::nullable("diagnosis", FieldType::Text),
        ],
        primary_key: Some("patient_id".to_string()),
        rules: vec![RecordRule::DateOrder {
            earlier: "admission_date".to_string(),
            later: "discharge_date".to_string(),
        }],
        load_policy: LoadPolicy::Upsert,
    }
}

fn treatments_schema() -> Schema {
    Schema {
        dataset: Dataset::Treatments,
        table: "treatments".to_string(),
        fields: vec![
            Field::required("treatment_id", FieldType::Text),
            Field::required("patient_id", FieldType::Text),
            Field::required("treatment_type", FieldType::Text),
            Field::required("treatment_date", FieldType::DateTime),
            Field::nullable("doctor_name", FieldType::Text),
            Field::nullable("treatment_notes", FieldType::Text),
            Field::nullable("cost", FieldType::Float).with_constraint(Constraint::NonNegative),
        ],
        primary_key: Some("treatment_id".to_string()),
        rules: Vec::new(),
        load_policy: LoadPolicy::Upsert,
    }
}

fn analysis_schema() -> Schema {
    let unknown = || FieldValue::Text("Unknown".to_string());
    Schema {
        dataset: Dataset::Analysis,
        table: "hospital_analysis".to_string(),
        fields: vec![
            Field::required("patient_id", FieldType::Text),
            Field::required("age", FieldType::Integer)
                .with_constraint(Constraint::Range { min: 0, max: 130 }),
            Field::required("gender", FieldType::Text).with_default(unknown()),
            Field::required("condition", FieldType::Text).with_default(unknown()),
            Field::required("procedure", FieldType::Text).with_default(unknown()),
            Field::required("cost", FieldType::Float).with_constraint(Constraint::NonNegative),
            Field::required("length_of_stay", FieldType::Integer)
                .with_constraint(Constraint::NonNegative),
            Field::required("readmission", FieldType::Text)
                .with_default(FieldValue::Text("No".to_string())),
            Field::required("outcome", FieldType::Text).with_default(unknown()),
            Field::required("satisfaction", FieldType::Integer)
                .with_default(FieldValue::Integer(3))
                .clamped(1, 5),
        ],
        primary_key: None,
        rules: Vec::new(),
        load_policy: LoadPolicy::Append,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_known_datasets() {
        let patients = schema_for("patients").unwrap();
        assert_eq!(patients.primary_key.as_deref(), Some("patient_id"));
        assert_eq!(patients.load_policy, LoadPolicy::Upsert);

        let analysis = schema_for("analysis").unwrap();
        assert_eq!(analysis.table, "hospital_analysis");
        assert!(analysis.primary_key.is_none());
        assert_eq!(analysis.load_policy, LoadPolicy::Append);
    }

    #[test]
    fn unknown_dataset_is_an_error() {
        let error = schema_for("pharmacy").unwrap_err();
        assert!(matches!(error, EtlError::UnknownDataset(name) if name == "pharmacy"));
    }

    #[test]
    fn satisfaction_clamps_but_cost_constrains() {
        let analysis = schema_of(Dataset::Analysis);
        let satisfaction = analysis.field("satisfaction").unwrap();
        assert_eq!(satisfaction.clamp, Some((1, 5)));
        assert!(satisfaction.constraints.is_empty());

        let cost = analysis.field("cost").unwrap();
        assert!(cost.clamp.is_none());
        assert_eq!(cost.constraints, vec![Constraint::NonNegative]);
    }

    #[test]
    fn schema_field_order_is_declaration_order() {
        let treatments = schema_of(Dataset::Treatments);
        let names: Vec<&str> = treatments.field_names().collect();
        assert_eq!(names[0], "treatment_id");
        assert_eq!(names.last(), Some(&"cost"));
    }
}
