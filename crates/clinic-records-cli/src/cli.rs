use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clinic_records_core::export::ExportFormat;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FormatArg {
    Json,
    Csv,
    Html,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Html => ExportFormat::Html,
        }
    }
}

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "clinic")]
#[command(about = "Clinic Records - Keep patient name, age and condition in a local store")]
#[command(version)]
pub struct Args {
    /// SQLite database file [default: clinic.db, or CLINIC_DB_PATH]
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Apply the add/edit field rules to imported records too
    #[arg(long, global = true)]
    pub strict_import: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show all patients, newest first
    List,

    /// Add a patient
    Add {
        name: String,
        /// Age in years (0-120)
        #[arg(allow_hyphen_values = true)]
        age: String,
        /// Condition or diagnosis
        disease: String,
    },

    /// Edit a patient; omitted fields keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        age: Option<String>,
        #[arg(long)]
        disease: Option<String>,
    },

    /// Delete a patient
    Delete { id: i64 },

    /// Find patients by name or condition
    Search { term: String },

    /// Show patient count and average age
    Stats,

    /// Export all patients to a file
    Export {
        /// Output path, or "-" for stdout [default: clinic-patients-<date>.<ext>]
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,
    },

    /// Replace all patients with a JSON array read from a file or stdin
    Import {
        /// JSON file [default: read stdin]
        file: Option<PathBuf>,
    },

    /// Delete every patient record
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from(["clinic", "add", "Jo", "5", "flu"]).unwrap();
        assert_eq!(
            args.command,
            Command::Add {
                name: "Jo".into(),
                age: "5".into(),
                disease: "flu".into()
            }
        );
        assert!(!args.yes);
    }

    #[test]
    fn test_negative_age_reaches_validation() {
        let args = Args::try_parse_from(["clinic", "add", "Jo", "-5", "flu"]).unwrap();
        assert!(matches!(args.command, Command::Add { age, .. } if age == "-5"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["clinic", "clear", "--yes", "--db", "/tmp/x.db"]).unwrap();
        assert!(args.yes);
        assert_eq!(args.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(args.command, Command::Clear);
    }

    #[test]
    fn test_export_defaults() {
        let args = Args::try_parse_from(["clinic", "export"]).unwrap();
        assert_eq!(
            args.command,
            Command::Export {
                output: None,
                format: FormatArg::Json
            }
        );
    }

    #[test]
    fn test_edit_partial() {
        let args = Args::try_parse_from(["clinic", "edit", "42", "--age", "31"]).unwrap();
        assert_eq!(
            args.command,
            Command::Edit {
                id: 42,
                name: None,
                age: Some("31".into()),
                disease: None
            }
        );
    }
}
