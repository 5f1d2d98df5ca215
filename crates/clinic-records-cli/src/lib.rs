//! Command-line front end for the clinic patient record store.
//!
//! The binary is a thin collaborator over [`clinic_records_core::PatientStore`]:
//! it parses arguments, asks for confirmation before destructive commands,
//! renders the patient table, and turns store results into notifications.

pub mod app;
pub mod cli;
pub mod confirm;
pub mod notify;
pub mod table;

pub use app::App;
pub use cli::{Args, Command};
pub use confirm::{AssumeYes, Confirm, ScriptedConfirm, StdioConfirm, TerminalConfirm};
pub use notify::{Notification, NotificationKind};
