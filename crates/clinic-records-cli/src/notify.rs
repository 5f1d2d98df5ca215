//! User-facing messages for command outcomes.

use std::fmt;

use clinic_records_core::StoreError;

pub const MSG_ADDED: &str = "Patient added successfully!";
pub const MSG_UPDATED: &str = "Patient updated successfully!";
pub const MSG_DELETED: &str = "Patient deleted successfully!";
pub const MSG_NOT_FOUND: &str = "Patient not found!";
pub const MSG_EXPORTED: &str = "Patient data exported successfully!";
pub const MSG_CLEARED: &str = "All patient data has been cleared.";
pub const MSG_CANCELLED: &str = "Cancelled. No records were changed.";
pub const MSG_BAD_IMPORT: &str = "Invalid data format. Please check your JSON data.";
pub const MSG_EMPTY_IMPORT: &str = "Please paste patient data to import";
pub const MSG_CORRUPT: &str =
    "Stored patient data could not be read. Export or clear it before making changes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    fn label(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

/// A one-line message shown after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }

    /// Translate a failed command into a message for the user.
    ///
    /// Store errors get fixed wording, with the reason appended for rejected
    /// imports; anything else shows the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::Validation(e)) => Self::error(e.to_string()),
            Some(StoreError::NotFound(_)) => Self::error(MSG_NOT_FOUND),
            Some(StoreError::StructuralImport(detail)) => {
                tracing::warn!(%detail, "import rejected");
                if detail == MSG_EMPTY_IMPORT {
                    Self::error(MSG_EMPTY_IMPORT)
                } else {
                    Self::error(format!("{} {}", MSG_BAD_IMPORT, detail))
                }
            }
            Some(StoreError::CorruptStorage(detail)) => {
                tracing::error!(%detail, "corrupt storage");
                Self::error(MSG_CORRUPT)
            }
            _ => Self::error(format!("{:#}", err)),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use clinic_records_core::ValidationError;

    #[test]
    fn test_display() {
        assert_eq!(
            Notification::success(MSG_ADDED).to_string(),
            "[success] Patient added successfully!"
        );
    }

    #[test]
    fn test_store_errors() {
        let err = anyhow::Error::new(StoreError::Validation(ValidationError::InvalidAge));
        assert_eq!(
            Notification::from_error(&err),
            Notification::error("Please enter a valid age (0-120)")
        );

        let err = anyhow::Error::new(StoreError::NotFound(7));
        assert_eq!(Notification::from_error(&err).message, MSG_NOT_FOUND);

        let err = anyhow::Error::new(StoreError::StructuralImport("entry 3: missing age".into()));
        assert_eq!(
            Notification::from_error(&err).message,
            format!("{} entry 3: missing age", MSG_BAD_IMPORT)
        );

        let err = anyhow::Error::new(StoreError::StructuralImport(MSG_EMPTY_IMPORT.into()));
        assert_eq!(Notification::from_error(&err).message, MSG_EMPTY_IMPORT);
    }

    #[test]
    fn test_context_is_looked_through() {
        let result: anyhow::Result<()> =
            Err(StoreError::NotFound(1)).context("editing patient 1");
        let err = result.unwrap_err();
        assert_eq!(Notification::from_error(&err).message, MSG_NOT_FOUND);
    }

    #[test]
    fn test_other_errors_show_chain() {
        let result: anyhow::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ))
        .context("reading import.json");
        let notification = Notification::from_error(&result.unwrap_err());
        assert!(notification.is_error());
        assert_eq!(notification.message, "reading import.json: no such file");
    }
}
