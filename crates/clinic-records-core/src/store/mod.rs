//! The patient record store.
//!
//! [`PatientStore`] owns the persisted collection. Every mutation reads the
//! stored collection, computes the complete next collection, and writes it
//! back as one JSON array under the configured storage key. Nothing is
//! written until the next state is fully built, so a failed operation leaves
//! storage exactly as it was.

mod ids;
mod import;
mod query;

pub use ids::*;
pub use import::*;
pub use query::*;

use thiserror::Error;

use crate::config::{ImportPolicy, StoreConfig};
use crate::db::{Database, DbError};
use crate::models::{PatientInput, PatientRecord, ValidationError};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid import: {0}")]
    StructuralImport(String),

    #[error("Patient not found: {0}")]
    NotFound(i64),

    #[error("Stored patient data is corrupt: {0}")]
    CorruptStorage(String),

    #[error("No record ids left to assign")]
    IdsExhausted,

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single source of truth for patient records.
pub struct PatientStore {
    db: Database,
    storage_key: String,
    import_policy: ImportPolicy,
    /// Collection as of the last load or write, used by [`PatientStore::search`]
    current: Vec<PatientRecord>,
    ids: IdGenerator,
}

impl PatientStore {
    /// Wrap an open database using the key and policy from `config`.
    pub fn new(db: Database, config: &StoreConfig) -> Self {
        Self {
            db,
            storage_key: config.storage_key.clone(),
            import_policy: config.import_policy,
            current: Vec::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Open the database named by `config` and load the collection.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let db = Database::open(&config.database_path)?;
        let mut store = Self::new(db, config);
        store.load_all()?;
        Ok(store)
    }

    /// Empty store over an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::new(db, &StoreConfig::default()))
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn import_policy(&self) -> ImportPolicy {
        self.import_policy
    }

    pub fn set_import_policy(&mut self, policy: ImportPolicy) {
        self.import_policy = policy;
    }

    /// Collection as of the last load or write.
    pub fn current(&self) -> &[PatientRecord] {
        &self.current
    }

    /// Record with `id` in the current collection.
    pub fn find(&self, id: i64) -> Option<&PatientRecord> {
        self.current.iter().find(|r| r.id == Some(id))
    }

    /// Raw persisted payload, if any.
    pub fn raw_payload(&self) -> StoreResult<Option<String>> {
        Ok(self.db.get_item(&self.storage_key)?)
    }

    /// Load the persisted collection. Empty when nothing has been stored.
    pub fn load_all(&mut self) -> StoreResult<Vec<PatientRecord>> {
        let records = self.read_persisted()?;
        tracing::debug!(count = records.len(), key = %self.storage_key, "loaded patients");
        self.current = records.clone();
        Ok(records)
    }

    /// Validate and insert a new record at the front of the collection.
    pub fn add(&mut self, input: &PatientInput) -> StoreResult<PatientRecord> {
        input.validate().inspect_err(|e| {
            tracing::warn!(field = %e.field(), "rejected new patient");
        })?;

        let mut records = self.read_persisted()?;
        let now = chrono::Utc::now();
        let id = self
            .ids
            .next_id(&records, now.timestamp_millis())
            .ok_or(StoreError::IdsExhausted)?;

        let record = PatientRecord::new(id, input, now.to_rfc3339());
        records.insert(0, record.clone());
        self.persist(records)?;

        tracing::info!(id, "patient added");
        Ok(record)
    }

    /// Validate and replace name, age and disease of record `id`.
    pub fn update(&mut self, id: i64, input: &PatientInput) -> StoreResult<PatientRecord> {
        input.validate().inspect_err(|e| {
            tracing::warn!(id, field = %e.field(), "rejected patient update");
        })?;

        let mut records = self.read_persisted()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        record.apply(input);
        let updated = record.clone();
        self.persist(records)?;

        tracing::info!(id, "patient updated");
        Ok(updated)
    }

    /// Remove record `id` if present and return the resulting collection.
    pub fn remove(&mut self, id: i64) -> StoreResult<Vec<PatientRecord>> {
        let mut records = self.read_persisted()?;
        let before = records.len();
        records.retain(|r| r.id != Some(id));
        let removed = before - records.len();
        self.persist(records.clone())?;

        tracing::info!(id, removed, "patient removed");
        Ok(records)
    }

    /// Replace the whole collection with `records`, stored verbatim.
    pub fn replace_all(&mut self, records: Vec<PatientRecord>) -> StoreResult<()> {
        check_structure(&records, self.import_policy).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected bulk replace");
        })?;

        let count = records.len();
        self.persist(records)?;
        tracing::info!(count, "collection replaced");
        Ok(())
    }

    /// Parse pasted JSON and replace the collection with it.
    ///
    /// Returns the number of imported records.
    pub fn import_json(&mut self, text: &str) -> StoreResult<usize> {
        let records = parse_import(text).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected import");
        })?;
        let count = records.len();
        self.replace_all(records)?;
        Ok(count)
    }

    /// Delete the persisted collection.
    pub fn clear(&mut self) -> StoreResult<()> {
        let existed = self.db.remove_item(&self.storage_key)?;
        self.current.clear();
        tracing::info!(existed, key = %self.storage_key, "collection cleared");
        Ok(())
    }

    /// Filter the current collection by name or disease.
    pub fn search(&self, term: &str) -> Vec<PatientRecord> {
        search(&self.current, term)
    }

    /// Count and rounded average age of `records`.
    pub fn stats(records: &[PatientRecord]) -> CollectionStats {
        stats(records)
    }

    fn read_persisted(&self) -> StoreResult<Vec<PatientRecord>> {
        let Some(payload) = self.db.get_item(&self.storage_key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&payload).map_err(|e| {
            tracing::warn!(key = %self.storage_key, error = %e, "corrupt patient payload");
            StoreError::CorruptStorage(e.to_string())
        })
    }

    fn persist(&mut self, records: Vec<PatientRecord>) -> StoreResult<()> {
        let payload = serde_json::to_string(&records).map_err(DbError::from)?;
        self.db.set_item(&self.storage_key, &payload)?;
        tracing::debug!(count = records.len(), bytes = payload.len(), "persisted patients");
        self.current = records;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientField;

    fn setup_store() -> PatientStore {
        PatientStore::open_in_memory().unwrap()
    }

    fn jo() -> PatientInput {
        PatientInput::new("Jo", 5, "flu")
    }

    #[test]
    fn test_load_empty() {
        let mut store = setup_store();
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.raw_payload().unwrap(), None);
    }

    #[test]
    fn test_add_then_reject() {
        let mut store = setup_store();

        let record = store.add(&jo()).unwrap();
        assert!(record.id.is_some());
        assert!(record.created_at.is_some());
        assert_eq!(store.load_all().unwrap(), vec![record]);

        let err = store.add(&PatientInput::new("J", 5, "flu")).unwrap_err();
        match err {
            StoreError::Validation(e) => assert_eq!(e.field(), PatientField::Name),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_add_prepends() {
        let mut store = setup_store();
        let first = store.add(&jo()).unwrap();
        let second = store.add(&PatientInput::new("Ann", 30, "cold")).unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
    }

    #[test]
    fn test_back_to_back_ids_unique() {
        let mut store = setup_store();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            let record = store.add(&jo()).unwrap();
            assert!(ids.insert(record.id.unwrap()));
        }
    }

    #[test]
    fn test_update_missing() {
        let mut store = setup_store();
        store.add(&jo()).unwrap();
        let before = store.raw_payload().unwrap();

        let err = store.update(999, &jo()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(999)));
        assert_eq!(store.raw_payload().unwrap(), before);
    }

    #[test]
    fn test_update_validates_before_lookup() {
        let mut store = setup_store();
        let err = store.update(999, &PatientInput::new("Jo", 500, "flu")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::InvalidAge)));
    }

    #[test]
    fn test_update_preserves_identity() {
        let mut store = setup_store();
        let original = store.add(&jo()).unwrap();
        let id = original.id.unwrap();

        let updated = store
            .update(id, &PatientInput::new(" Joanna ", 6, "measles"))
            .unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.name, "Joanna");
        assert_eq!(store.load_all().unwrap(), vec![updated]);
    }

    #[test]
    fn test_remove_idempotent() {
        let mut store = setup_store();
        let a = store.add(&jo()).unwrap();
        store.add(&PatientInput::new("Ann", 30, "cold")).unwrap();

        let once = store.remove(a.id.unwrap()).unwrap();
        let twice = store.remove(a.id.unwrap()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn test_corrupt_payload() {
        let mut store = setup_store();
        store.db.set_item("clinicPatients", "{not json").unwrap();
        assert!(matches!(store.load_all(), Err(StoreError::CorruptStorage(_))));

        store.db.set_item("clinicPatients", r#"{"name":"A"}"#).unwrap();
        assert!(matches!(store.load_all(), Err(StoreError::CorruptStorage(_))));

        // Mutations refuse to overwrite a payload they cannot read
        assert!(matches!(store.add(&jo()), Err(StoreError::CorruptStorage(_))));
        assert_eq!(
            store.raw_payload().unwrap().as_deref(),
            Some(r#"{"name":"A"}"#)
        );
    }

    #[test]
    fn test_clear() {
        let mut store = setup_store();
        store.add(&jo()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.raw_payload().unwrap(), None);
        assert!(store.current().is_empty());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_search_uses_current_snapshot() {
        let mut store = setup_store();
        store.add(&PatientInput::new("Maria", 52, "diabetes")).unwrap();

        // Written behind the store's back; search does not reload
        store.db.set_item("clinicPatients", "[]").unwrap();
        assert_eq!(store.search("diab").len(), 1);

        store.load_all().unwrap();
        assert!(store.search("diab").is_empty());
    }

    #[test]
    fn test_custom_storage_key() {
        let db = Database::open_in_memory().unwrap();
        let config = StoreConfig {
            storage_key: "ward-b".into(),
            ..StoreConfig::default()
        };
        let mut store = PatientStore::new(db, &config);
        store.add(&jo()).unwrap();
        assert_eq!(store.db.list_keys().unwrap(), vec!["ward-b".to_string()]);
    }
}
