//! Record id assignment.

use crate::models::PatientRecord;

/// Issues ids that are unique within a collection.
///
/// Ids start from the current time in milliseconds so they sort alongside
/// ids written by earlier versions of the clinic app, but each new id is also
/// strictly greater than the last one issued and than every id already in
/// the collection. Back-to-back creations in the same millisecond therefore
/// never collide.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last_issued: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for a record joining `records`. `None` once ids are exhausted.
    pub fn next_id(&mut self, records: &[PatientRecord], now_millis: i64) -> Option<i64> {
        let mut id = now_millis;
        if let Some(last) = self.last_issued {
            id = id.max(last.checked_add(1)?);
        }
        if let Some(max) = records.iter().filter_map(|r| r.id).max() {
            id = id.max(max.checked_add(1)?);
        }
        self.last_issued = Some(id);
        Some(id)
    }
}
