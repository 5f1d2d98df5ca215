//! JSON and CSV export of patient records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::models::PatientRecord;

/// Output formats offered by the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Download name for an export taken on `date`, e.g. `clinic-patients-2024-03-01.json`.
pub fn export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!("clinic-patients-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Export to JSON, pretty-printed with two-space indentation.
pub fn to_json_pretty(records: &[PatientRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Export to CSV format.
pub fn to_csv(records: &[PatientRecord]) -> String {
    let mut csv = String::new();

    // Header
    csv.push_str("id,name,age,disease,created_at\n");

    for record in records {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            record.id.map(|id| id.to_string()).unwrap_or_default(),
            escape_csv(&record.name),
            record.age,
            escape_csv(&record.disease),
            escape_csv(record.created_timestamp().unwrap_or("")),
        ));
    }

    csv
}

/// Render `records` in the given format.
pub fn render(records: &[PatientRecord], format: ExportFormat) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => to_json_pretty(records),
        ExportFormat::Csv => Ok(to_csv(records)),
        ExportFormat::Html => Ok(super::to_html_document(records)),
    }
}

/// Escape a string for CSV (quote if contains comma, quote, or newline).
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
