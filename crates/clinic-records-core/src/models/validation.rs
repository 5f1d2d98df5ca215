//! Field rules for patient input.

use std::fmt;

use thiserror::Error;

/// Minimum trimmed length of name and disease.
pub const MIN_TEXT_LEN: usize = 2;

/// Accepted age range, inclusive.
pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;

/// The editable fields of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    Name,
    Age,
    Disease,
}

impl PatientField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientField::Name => "name",
            PatientField::Age => "age",
            PatientField::Disease => "disease",
        }
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected add/update input. Exactly one is reported per call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid name (at least 2 characters)")]
    InvalidName,

    #[error("Please enter a valid age (0-120)")]
    InvalidAge,

    #[error("Please enter a valid disease/condition")]
    InvalidDisease,
}

impl ValidationError {
    /// The field that failed.
    pub fn field(&self) -> PatientField {
        match self {
            ValidationError::InvalidName => PatientField::Name,
            ValidationError::InvalidAge => PatientField::Age,
            ValidationError::InvalidDisease => PatientField::Disease,
        }
    }
}

/// Apply the rules in order: name, age, disease.
///
/// `age` is `None` when the caller could not read an integer at all.
pub fn validate_fields(name: &str, age: Option<i64>, disease: &str) -> Result<(), ValidationError> {
    if !has_min_len(name) {
        return Err(ValidationError::InvalidName);
    }
    match age {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => {}
        _ => return Err(ValidationError::InvalidAge),
    }
    if !has_min_len(disease) {
        return Err(ValidationError::InvalidDisease);
    }
    Ok(())
}

fn has_min_len(text: &str) -> bool {
    text.trim().chars().count() >= MIN_TEXT_LEN
}
