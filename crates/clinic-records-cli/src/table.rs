//! Plain-text patient table.

use clinic_records_core::{CollectionStats, PatientRecord};

pub const NO_PATIENTS: &str = "No patients found.";

const HEADERS: [&str; 5] = ["ID", "Name", "Age", "Condition", "Added"];

/// Render records as an aligned text table.
pub fn render_table(records: &[PatientRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", NO_PATIENTS);
    }

    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                r.name.clone(),
                r.age.to_string(),
                r.disease.clone(),
                r.created_date().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("  ").as_str());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width - cell.chars().count();
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

/// Summary line shown above the table.
pub fn render_stats(stats: &CollectionStats) -> String {
    format!(
        "Total patients: {}  |  Average age: {}\n",
        stats.count, stats.average_age
    )
}
