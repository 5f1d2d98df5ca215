//! Patient models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{validate_fields, ValidationError};

/// A single patient record as persisted in the collection.
///
/// `id` and `created_at` are always set for records created through the
/// store. Bulk imports are stored verbatim, so either may be missing there.
/// Keys the store does not interpret, including a camel-case `createdAt` and
/// explicit `null` ids or timestamps, stay in `extra` under their own
/// spelling and are written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Map<String, Value>")]
pub struct PatientRecord {
    /// Unique within the collection, immutable once assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Patient name
    pub name: String,
    /// Age in years
    pub age: i64,
    /// Condition or diagnosis, free-form
    pub disease: String,
    /// Creation timestamp (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields carried by imported records that the store does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a JSON object could not be read as a patient record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordShapeError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("{field} must be {expected}, found {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
}

impl TryFrom<Map<String, Value>> for PatientRecord {
    type Error = RecordShapeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let name = take_required(&mut fields, "name", "a string", as_string)?;
        let age = take_required(&mut fields, "age", "a whole number", Value::as_i64)?;
        let disease = take_required(&mut fields, "disease", "a string", as_string)?;
        let id = take_optional(&mut fields, "id", "a whole number", Value::as_i64)?;
        let created_at = take_optional(&mut fields, "created_at", "a string", as_string)?;

        Ok(Self {
            id,
            name,
            age,
            disease,
            created_at,
            extra: fields,
        })
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Move `key` out of `fields` if it holds a usable value.
///
/// Absent and `null` both read as `None`; a `null` is left in place.
fn take_optional<T>(
    fields: &mut Map<String, Value>,
    key: &'static str,
    expected: &'static str,
    read: impl Fn(&Value) -> Option<T>,
) -> Result<Option<T>, RecordShapeError> {
    let value = match fields.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let typed = read(value).ok_or_else(|| RecordShapeError::WrongType {
        field: key,
        expected,
        found: value.to_string(),
    })?;
    fields.remove(key);
    Ok(Some(typed))
}

fn take_required<T>(
    fields: &mut Map<String, Value>,
    key: &'static str,
    expected: &'static str,
    read: impl Fn(&Value) -> Option<T>,
) -> Result<T, RecordShapeError> {
    take_optional(fields, key, expected, read)?.ok_or(RecordShapeError::Missing(key))
}

impl PatientRecord {
    /// Build a freshly created record from validated input.
    ///
    /// Name and disease are stored trimmed.
    pub fn new(id: i64, input: &PatientInput, created_at: String) -> Self {
        Self {
            id: Some(id),
            name: input.name.trim().to_string(),
            age: input.age,
            disease: input.disease.trim().to_string(),
            created_at: Some(created_at),
            extra: Map::new(),
        }
    }

    /// Replace the editable fields, keeping id, creation time and extras.
    pub fn apply(&mut self, input: &PatientInput) {
        self.name = input.name.trim().to_string();
        self.age = input.age;
        self.disease = input.disease.trim().to_string();
    }

    /// Case-insensitive substring match on name or disease.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.disease.to_lowercase().contains(needle)
    }

    /// Creation timestamp under either spelling, `created_at` first.
    pub fn created_timestamp(&self) -> Option<&str> {
        self.created_at
            .as_deref()
            .or_else(|| self.extra.get("createdAt").and_then(Value::as_str))
    }

    /// Date part of the creation timestamp, if one is recorded.
    pub fn created_date(&self) -> Option<String> {
        let created = self.created_timestamp()?;
        match chrono::DateTime::parse_from_rfc3339(created) {
            Ok(ts) => Some(ts.date_naive().to_string()),
            // Fall back to whatever precedes the time separator
            Err(_) => created.split('T').next().map(str::to_string),
        }
    }
}

/// Editable fields supplied by add and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientInput {
    pub name: String,
    pub age: i64,
    pub disease: String,
}

impl PatientInput {
    pub fn new(name: impl Into<String>, age: i64, disease: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            disease: disease.into(),
        }
    }

    /// Build input from raw form text, where age arrives unparsed.
    ///
    /// Fields are checked in the same order as [`PatientInput::validate`], so
    /// an unparseable age is only reported once the name has passed.
    pub fn from_form(name: &str, age: &str, disease: &str) -> Result<Self, ValidationError> {
        let parsed = parse_leading_int(age);
        validate_fields(name, parsed, disease)?;
        Ok(Self {
            name: name.trim().to_string(),
            age: parsed.ok_or(ValidationError::InvalidAge)?,
            disease: disease.trim().to_string(),
        })
    }

    /// Check the add/update rules, stopping at the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, Some(self.age), &self.disease)
    }
}

/// Parse the leading integer of `text`, ignoring anything after it.
///
/// `" 42 years"` yields 42, `"4.7"` yields 4, `"abc"` yields `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_trims_fields() {
        let input = PatientInput::new("  Jo ", 5, " flu ");
        let record = PatientRecord::new(7, &input, "2024-03-01T10:00:00Z".into());
        assert_eq!(record.id, Some(7));
        assert_eq!(record.name, "Jo");
        assert_eq!(record.disease, "flu");
        assert_eq!(record.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
    }

    #[test]
    fn test_serialized_field_names() {
        let input = PatientInput::new("Jo", 5, "flu");
        let record = PatientRecord::new(1, &input, "2024-03-01T10:00:00Z".into());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"name":"Jo","age":5,"disease":"flu","created_at":"2024-03-01T10:00:00Z"}"#
        );
    }

    #[test]
    fn test_camel_case_created_at_kept_as_given() {
        let raw = r#"{"id":3,"name":"Ann","age":40,"disease":"asthma","createdAt":"2024-01-02T00:00:00Z"}"#;
        let record: PatientRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.created_at, None);
        assert_eq!(record.created_timestamp(), Some("2024-01-02T00:00:00Z"));
        assert_eq!(record.created_date().as_deref(), Some("2024-01-02"));
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }

    #[test]
    fn test_both_timestamp_spellings() {
        let raw = r#"{"name":"A","age":1,"disease":"xx","created_at":"2024-05-05T00:00:00Z","createdAt":"y"}"#;
        let record: PatientRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.created_timestamp(), Some("2024-05-05T00:00:00Z"));
        assert_eq!(record.extra.get("createdAt"), Some(&Value::from("y")));
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }

    #[test]
    fn test_explicit_nulls_kept() {
        let raw = r#"{"id":null,"name":"A","age":1,"disease":"xx","created_at":null}"#;
        let record: PatientRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.created_timestamp(), None);

        let back: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_shape_errors() {
        let parse = |raw: &str| {
            let fields: Map<String, Value> = serde_json::from_str(raw).unwrap();
            PatientRecord::try_from(fields)
        };

        assert_eq!(
            parse(r#"{"age":1,"disease":"xx"}"#),
            Err(RecordShapeError::Missing("name"))
        );
        assert_eq!(
            parse(r#"{"name":"A","age":null,"disease":"xx"}"#),
            Err(RecordShapeError::Missing("age"))
        );
        assert_eq!(
            parse(r#"{"name":"A","age":"30","disease":"xx"}"#)
                .unwrap_err()
                .to_string(),
            r#"age must be a whole number, found "30""#
        );
        assert_eq!(
            parse(r#"{"name":"A","age":30.5,"disease":"xx"}"#)
                .unwrap_err()
                .to_string(),
            "age must be a whole number, found 30.5"
        );
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut record =
            PatientRecord::new(9, &PatientInput::new("Max", 30, "cough"), "2024-01-01T00:00:00Z".into());
        record.apply(&PatientInput::new("Maxine ", 31, "bronchitis"));
        assert_eq!(record.id, Some(9));
        assert_eq!(record.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(record.name, "Maxine");
        assert_eq!(record.age, 31);
    }

    #[test]
    fn test_matches_name_or_disease() {
        let record =
            PatientRecord::new(1, &PatientInput::new("Maria Lopez", 52, "Diabetes"), "x".into());
        assert!(record.matches("maria"));
        assert!(record.matches("diab"));
        assert!(!record.matches("flu"));
    }

    #[test]
    fn test_created_date() {
        let record = PatientRecord::new(
            1,
            &PatientInput::new("Jo", 5, "flu"),
            "2024-03-01T23:10:00+00:00".into(),
        );
        assert_eq!(record.created_date().as_deref(), Some("2024-03-01"));

        let mut legacy = record.clone();
        legacy.created_at = Some("2023-12-31T08:00:00.000Z".into());
        assert_eq!(legacy.created_date().as_deref(), Some("2023-12-31"));

        legacy.created_at = None;
        assert_eq!(legacy.created_date(), None);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int(" 42 years"), Some(42));
        assert_eq!(parse_leading_int("4.7"), Some(4));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_from_form() {
        let input = PatientInput::from_form(" Jo ", "5", " flu").unwrap();
        assert_eq!(input, PatientInput::new("Jo", 5, "flu"));

        assert_eq!(
            PatientInput::from_form("Jo", "five", "flu"),
            Err(ValidationError::InvalidAge)
        );
        // Name is checked before age
        assert_eq!(
            PatientInput::from_form("J", "five", "flu"),
            Err(ValidationError::InvalidName)
        );
    }
}
