//! HTML rendering of the patient table.

use crate::models::PatientRecord;
use crate::store::stats;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render records as a `<table>` fragment, or a placeholder paragraph when empty.
pub fn to_html_table(records: &[PatientRecord]) -> String {
    if records.is_empty() {
        return "<p class=\"no-patients\">No patients found.</p>\n".to_string();
    }

    let mut html = String::new();
    html.push_str("<table class=\"patients-table\">\n");
    html.push_str(
        "  <thead><tr><th>ID</th><th>Name</th><th>Age</th><th>Condition</th><th>Added</th></tr></thead>\n",
    );
    html.push_str("  <tbody>\n");
    for record in records {
        html.push_str(&format!(
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            record.id.map(|id| id.to_string()).unwrap_or_default(),
            escape_html(&record.name),
            record.age,
            escape_html(&record.disease),
            escape_html(&record.created_date().unwrap_or_default()),
        ));
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Standalone HTML page with the summary figures and the table.
pub fn to_html_document(records: &[PatientRecord]) -> String {
    let summary = stats(records);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Clinic Patients</title>\n</head>\n<body>\n<h1>Clinic Patients</h1>\n<p>Total patients: {} &middot; Average age: {}</p>\n{}</body>\n</html>\n",
        summary.count,
        summary.average_age,
        to_html_table(records),
    )
}
