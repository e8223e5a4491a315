//! Persistence seam for daily logs.
//!
//! ## Module Structure
//!
//! - [`memory`]: Process-local store backed by a mutex-guarded map
//! - [`sqlite`]: Durable store on a single SQLite file
//!
//! Writes are expressed as a [`LogPatch`] of field-level changes so that a
//! store can apply them as one read-modify-write under its own lock or
//! transaction. Either every change in a patch lands or none does.

pub mod memory;
pub mod sqlite;

use chrono::NaiveDate;

use crate::daily::{DailyLog, LogId, Mark, NewDailyLog, UngatedEntry, UngatedField};
use crate::error::{DaybookError, StoreError};
use crate::prayer::GatedField;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage for daily logs, unique per (user, date).
#[cfg_attr(test, mockall::automock)]
pub trait LogStore {
    fn find_by_key(&self, user_id: &str, date: NaiveDate)
    -> Result<Option<DailyLog>, StoreError>;

    fn find_by_id(&self, id: LogId) -> Result<Option<DailyLog>, StoreError>;

    /// Records for `user_id` with `from <= date <= to`, oldest first.
    fn find_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyLog>, StoreError>;

    /// Create a record with every field unset.
    ///
    /// Fails with [`StoreError::Conflict`] when the key already exists.
    fn insert(&self, new: NewDailyLog) -> Result<DailyLog, StoreError>;

    /// Apply `patch` to record `id` atomically and return the stored result.
    fn update(&self, id: LogId, patch: &LogPatch) -> Result<DailyLog, StoreError>;

    fn delete(&self, id: LogId) -> Result<(), StoreError>;
}

/// One field-level write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Gated(GatedField, Mark),
    TravelMode(bool),
    Ungated(UngatedEntry),
    Cleared(UngatedField),
}

/// An ordered set of changes applied as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogPatch {
    changes: Vec<Change>,
}

impl LogPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(mut self, field: GatedField, mark: Mark) -> Self {
        self.changes.push(Change::Gated(field, mark));
        self
    }

    pub fn travel_mode(mut self, active: bool) -> Self {
        self.changes.push(Change::TravelMode(active));
        self
    }

    pub fn ungated(mut self, entry: UngatedEntry) -> Self {
        self.changes.push(Change::Ungated(entry));
        self
    }

    pub fn cleared(mut self, field: UngatedField) -> Self {
        self.changes.push(Change::Cleared(field));
        self
    }

    /// Apply every change to `log` in order.
    pub fn apply(&self, log: &mut DailyLog) {
        for change in &self.changes {
            match change {
                Change::Gated(field, mark) => *log.mark_mut(*field) = *mark,
                Change::TravelMode(active) => log.travel_mode_active = *active,
                Change::Ungated(entry) => log.put_ungated(entry.clone()),
                Change::Cleared(field) => log.clear_ungated(*field),
            }
        }
    }
}

/// Fetch the record for (user, date), creating it if absent.
///
/// Two callers racing on the same key both end up with the one stored record:
/// the loser of the insert sees a conflict and reads the winner's row.
pub fn get_or_create<S: LogStore + ?Sized>(
    store: &S,
    user_id: &str,
    date: NaiveDate,
) -> Result<DailyLog, DaybookError> {
    let existing = store
        .find_by_key(user_id, date)
        .inspect_err(|e| log_error!("Looking up daily log for {user_id} on {date} failed: {e}"))?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    match store.insert(NewDailyLog::new(user_id, date)) {
        Ok(created) => {
            log_info!("Started the daily log for {date}");
            Ok(created)
        }
        Err(StoreError::Conflict { .. }) => store.find_by_key(user_id, date)?.ok_or_else(|| {
            DaybookError::Persistence(StoreError::Unavailable(format!(
                "daily log for {user_id} on {date} vanished after a conflicting insert"
            )))
        }),
        Err(e) => {
            log_error!("Creating daily log for {user_id} on {date} failed: {e}");
            Err(e.into())
        }
    }
}
