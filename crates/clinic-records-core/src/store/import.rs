//! Bulk import parsing and structural checks.

use std::collections::HashSet;

use serde_json::Value;

use super::{StoreError, StoreResult};
use crate::config::ImportPolicy;
use crate::models::{validate_fields, PatientRecord};

/// Parse pasted JSON text into records.
///
/// The text must be a JSON array of objects, each with a string `name`, a
/// whole-number `age` and a string `disease`. Records are kept as given: no
/// ids or timestamps are filled in. Emptiness is left to [`check_structure`].
pub fn parse_import(text: &str) -> StoreResult<Vec<PatientRecord>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StoreError::StructuralImport(
            "Please paste patient data to import".into(),
        ));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::StructuralImport(format!("Not valid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(StoreError::StructuralImport(
            "Imported data must be an array of patients".into(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| record_from_value(index, item))
        .collect()
}

fn record_from_value(index: usize, item: Value) -> StoreResult<PatientRecord> {
    let Value::Object(fields) = item else {
        return Err(invalid_entry(index, "not an object"));
    };
    PatientRecord::try_from(fields).map_err(|e| invalid_entry(index, &e.to_string()))
}

fn invalid_entry(index: usize, reason: &str) -> StoreError {
    StoreError::StructuralImport(format!(
        "Invalid patient data structure (entry {}: {})",
        index, reason
    ))
}

/// Check records about to replace the collection.
///
/// Both policies require non-empty name and disease and unique ids.
/// [`ImportPolicy::Strict`] additionally applies the add/update field rules.
pub fn check_structure(records: &[PatientRecord], policy: ImportPolicy) -> StoreResult<()> {
    let mut seen = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        if record.name.is_empty() {
            return Err(invalid_entry(index, "missing name"));
        }
        if record.disease.is_empty() {
            return Err(invalid_entry(index, "missing disease"));
        }
        if policy == ImportPolicy::Strict {
            validate_fields(&record.name, Some(record.age), &record.disease)
                .map_err(|e| invalid_entry(index, &e.to_string()))?;
        }
        if let Some(id) = record.id {
            if !seen.insert(id) {
                return Err(invalid_entry(index, &format!("duplicate id {}", id)));
            }
        }
    }

    Ok(())
}
