//! Clinic Records Core Library
//!
//! Local-first patient record store for a small clinic.
//!
//! # Architecture
//!
//! ```text
//!   UI (mobile via FFI, or the `clinic` CLI)
//!                    │
//!        add / update / remove / import / clear
//!                    │
//!    ┌───────────────▼───────────────┐
//!    │         PatientStore          │
//!    │  validate → next collection   │
//!    │  → persist whole JSON array   │
//!    └───────────────┬───────────────┘
//!                    │
//!          kv_store[clinicPatients]
//!               (SQLite)
//! ```
//!
//! # Core Principle
//!
//! **Storage is written only with a complete next state.** A rejected or
//! failed operation leaves the persisted collection byte-for-byte unchanged.
//!
//! # Modules
//!
//! - [`db`]: SQLite key-value layer
//! - [`models`]: Domain types (PatientRecord, PatientInput) and field rules
//! - [`store`]: PatientStore, search and statistics
//! - [`export`]: JSON, CSV and HTML export
//! - [`config`]: Store configuration

pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::{ImportPolicy, StoreConfig};
pub use db::Database;
pub use models::{PatientField, PatientInput, PatientRecord, ValidationError};
pub use store::{CollectionStats, PatientStore, StoreError, StoreResult};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt storage: {0}")]
    CorruptStorage(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<StoreError> for ClinicError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => ClinicError::InvalidInput(v.to_string()),
            StoreError::StructuralImport(msg) => ClinicError::InvalidImport(msg),
            StoreError::NotFound(id) => ClinicError::NotFound(id.to_string()),
            StoreError::CorruptStorage(msg) => ClinicError::CorruptStorage(msg),
            other => ClinicError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ValidationError> for ClinicError {
    fn from(e: ValidationError) -> Self {
        ClinicError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(e: serde_json::Error) -> Self {
        ClinicError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given database path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = StoreConfig {
        database_path: path.into(),
        ..StoreConfig::default()
    };
    let store = PatientStore::open(&config)?;
    Ok(Arc::new(ClinicCore {
        store: Mutex::new(store),
    }))
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<ClinicCore>, ClinicError> {
    let store = PatientStore::open_in_memory()?;
    Ok(Arc::new(ClinicCore {
        store: Mutex::new(store),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    store: Mutex<PatientStore>,
}

#[uniffi::export]
impl ClinicCore {
    /// Load every stored patient, newest first.
    pub fn load_all(&self) -> Result<Vec<FfiPatientRecord>, ClinicError> {
        let mut store = self.store.lock()?;
        let records = store.load_all()?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Add a patient from form fields. Age arrives as entered.
    pub fn add_patient(
        &self,
        name: String,
        age: String,
        disease: String,
    ) -> Result<FfiPatientRecord, ClinicError> {
        let input = PatientInput::from_form(&name, &age, &disease)?;
        let mut store = self.store.lock()?;
        Ok(store.add(&input)?.into())
    }

    /// Edit a patient's name, age and condition.
    pub fn update_patient(
        &self,
        id: i64,
        name: String,
        age: String,
        disease: String,
    ) -> Result<FfiPatientRecord, ClinicError> {
        let input = PatientInput::from_form(&name, &age, &disease)?;
        let mut store = self.store.lock()?;
        Ok(store.update(id, &input)?.into())
    }

    /// Delete a patient. The caller confirms with the user first.
    pub fn remove_patient(&self, id: i64) -> Result<Vec<FfiPatientRecord>, ClinicError> {
        let mut store = self.store.lock()?;
        let records = store.remove(id)?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Replace all patients with pasted JSON. Returns the imported count.
    pub fn import_json(&self, text: String) -> Result<u64, ClinicError> {
        let mut store = self.store.lock()?;
        let count = store.import_json(&text)?;
        Ok(count as u64)
    }

    /// Delete every patient. The caller confirms twice first.
    pub fn clear(&self) -> Result<(), ClinicError> {
        let mut store = self.store.lock()?;
        store.clear()?;
        Ok(())
    }

    /// Filter the last loaded collection by name or condition.
    pub fn search(&self, term: String) -> Result<Vec<FfiPatientRecord>, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.search(&term).into_iter().map(|r| r.into()).collect())
    }

    /// Count and average age of the last loaded collection.
    pub fn stats(&self) -> Result<FfiCollectionStats, ClinicError> {
        let store = self.store.lock()?;
        Ok(PatientStore::stats(store.current()).into())
    }

    /// Export stored patients as pretty JSON.
    pub fn export_json(&self) -> Result<String, ClinicError> {
        let mut store = self.store.lock()?;
        let records = store.load_all()?;
        Ok(export::to_json_pretty(&records)?)
    }

    /// Suggested file name for an export taken today.
    pub fn export_file_name(&self) -> String {
        let today = chrono::Local::now().date_naive();
        export::export_file_name(today, export::ExportFormat::Json)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub id: Option<i64>,
    pub name: String,
    pub age: i64,
    pub disease: String,
    pub created_at: Option<String>,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(record: PatientRecord) -> Self {
        let created_at = record.created_timestamp().map(str::to_string);
        Self {
            id: record.id,
            name: record.name,
            age: record.age,
            disease: record.disease,
            created_at,
        }
    }
}

/// FFI-safe collection statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCollectionStats {
    pub count: u64,
    pub average_age: i64,
}

impl From<CollectionStats> for FfiCollectionStats {
    fn from(stats: CollectionStats) -> Self {
        Self {
            count: stats.count as u64,
            average_age: stats.average_age,
        }
    }
}
