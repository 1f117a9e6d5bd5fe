//! Persistence collaborator for finished readings.
//!
//! The engine never saves anything itself; callers hand a [`FinishedReading`]
//! to a [`ReadingStore`]. Re-saving the same finished session is idempotent,
//! so a retried save after a flaky network call does not create a second
//! history entry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::reading_engine::{
    error::{ReadingError, ReadingResult},
    models::{FinishedReading, ReadingOwner, SavedReading, SavedReadingId},
};

pub trait ReadingStore {
    /// Persist `reading` for `owner`, returning the record id. Re-saving the
    /// same finished session returns the id of the existing record; a
    /// different reading under an already saved session id is an error.
    fn save(&self, owner: &ReadingOwner, reading: &FinishedReading) -> ReadingResult<SavedReadingId>;

    fn get(&self, id: SavedReadingId) -> ReadingResult<Option<SavedReading>>;

    /// Readings for `owner`, newest first.
    fn list_for_owner(&self, owner: &ReadingOwner) -> ReadingResult<Vec<SavedReading>>;

    fn set_favorite(&self, id: SavedReadingId, is_favorite: bool) -> ReadingResult<()>;

    /// Returns whether a record was removed.
    fn delete(&self, id: SavedReadingId) -> ReadingResult<bool>;
}

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<SavedReadingId, SavedReading>,
    by_session: HashMap<Uuid, SavedReadingId>,
    /// Insertion order; higher is newer.
    seq: HashMap<SavedReadingId, u64>,
    next_seq: u64,
}

/// Process-local store, handy for tests and offline mode.
#[derive(Debug, Default)]
pub struct InMemoryReadingStore {
    records: Mutex<Records>,
}

impl InMemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ReadingResult<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|_| ReadingError::Persistence("reading store lock poisoned".into()))
    }
}

impl ReadingStore for InMemoryReadingStore {
    fn save(&self, owner: &ReadingOwner, reading: &FinishedReading) -> ReadingResult<SavedReadingId> {
        let mut records = self.lock()?;
        if let Some(&existing) = records.by_session.get(&reading.session_id) {
            let same_owner = records.by_id.get(&existing).is_some_and(|r| &r.owner == owner);
            if !same_owner {
                return Err(ReadingError::Persistence(format!(
                    "session {} is already saved for another owner",
                    reading.session_id
                )));
            }
            let same_reading = records.by_id.get(&existing).is_some_and(|r| r.reading == *reading);
            if !same_reading {
                return Err(ReadingError::Persistence(format!(
                    "session {} is already saved with a different reading",
                    reading.session_id
                )));
            }
            debug!(id = %existing, session_id = %reading.session_id, "reading already saved");
            return Ok(existing);
        }

        let id = Uuid::new_v4();
        let seq = records.next_seq;
        records.next_seq += 1;
        records.seq.insert(id, seq);
        records.by_session.insert(reading.session_id, id);
        records.by_id.insert(
            id,
            SavedReading {
                id,
                owner: owner.clone(),
                reading: reading.clone(),
                created_at: Utc::now(),
                is_favorite: false,
            },
        );
        info!(%id, %owner, reading_type = %reading.reading_type, "reading saved");
        Ok(id)
    }

    fn get(&self, id: SavedReadingId) -> ReadingResult<Option<SavedReading>> {
        Ok(self.lock()?.by_id.get(&id).cloned())
    }

    fn list_for_owner(&self, owner: &ReadingOwner) -> ReadingResult<Vec<SavedReading>> {
        let records = self.lock()?;
        let mut list: Vec<SavedReading> =
            records.by_id.values().filter(|r| &r.owner == owner).cloned().collect();
        list.sort_by_key(|r| std::cmp::Reverse(records.seq.get(&r.id).copied().unwrap_or_default()));
        Ok(list)
    }

    fn set_favorite(&self, id: SavedReadingId, is_favorite: bool) -> ReadingResult<()> {
        let mut records = self.lock()?;
        let record = records
            .by_id
            .get_mut(&id)
            .ok_or_else(|| ReadingError::Persistence(format!("reading {id} not found")))?;
        record.is_favorite = is_favorite;
        Ok(())
    }

    fn delete(&self, id: SavedReadingId) -> ReadingResult<bool> {
        let mut records = self.lock()?;
        match records.by_id.remove(&id) {
            Some(removed) => {
                records.by_session.remove(&removed.reading.session_id);
                records.seq.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
