//! Process-local log store.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;
#[cfg(any(test, feature = "testing-support"))]
use std::sync::atomic::{AtomicBool, Ordering};

use super::{LogPatch, LogStore};
use crate::daily::{DailyLog, LogId, NewDailyLog};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    next_id: LogId,
    logs: BTreeMap<LogId, DailyLog>,
}

/// Store that keeps every record in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    #[cfg(any(test, feature = "testing-support"))]
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backing service were down.
    #[cfg(any(test, feature = "testing-support"))]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        #[cfg(any(test, feature = "testing-support"))]
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl LogStore for MemoryStore {
    fn find_by_key(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyLog>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .logs
            .values()
            .find(|log| log.user_id == user_id && log.date == date)
            .cloned())
    }

    fn find_by_id(&self, id: LogId) -> Result<Option<DailyLog>, StoreError> {
        Ok(self.lock()?.logs.get(&id).cloned())
    }

    fn find_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyLog>, StoreError> {
        let inner = self.lock()?;
        let mut logs: Vec<DailyLog> = inner
            .logs
            .values()
            .filter(|log| log.user_id == user_id && (from..=to).contains(&log.date))
            .cloned()
            .collect();
        logs.sort_by_key(|log| log.date);
        Ok(logs)
    }

    fn insert(&self, new: NewDailyLog) -> Result<DailyLog, StoreError> {
        let mut inner = self.lock()?;
        if inner
            .logs
            .values()
            .any(|log| log.user_id == new.user_id && log.date == new.date)
        {
            return Err(StoreError::Conflict {
                user_id: new.user_id,
                date: new.date,
            });
        }

        inner.next_id += 1;
        let log = DailyLog::new(inner.next_id, new);
        inner.logs.insert(log.id, log.clone());
        Ok(log)
    }

    fn update(&self, id: LogId, patch: &LogPatch) -> Result<DailyLog, StoreError> {
        let mut inner = self.lock()?;
        let log = inner.logs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply(log);
        Ok(log.clone())
    }

    fn delete(&self, id: LogId) -> Result<(), StoreError> {
        self.lock()?
            .logs
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::{Mark, UngatedField};
    use crate::prayer::{GatedField, PrayerId};
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let store = MemoryStore::new();
        store.insert(NewDailyLog::new("a", day(1))).unwrap();
        let err = store.insert(NewDailyLog::new("a", day(1))).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        // Same date, different user is fine
        assert!(store.insert(NewDailyLog::new("b", day(1))).is_ok());
    }

    #[test]
    fn test_update_and_find() {
        let store = MemoryStore::new();
        let log = store.insert(NewDailyLog::new("a", day(1))).unwrap();
        let patch = LogPatch::new()
            .gated(GatedField::Prayer(PrayerId::Asr), Mark::done_at(Utc::now()))
            .cleared(UngatedField::Reading);
        let updated = store.update(log.id, &patch).unwrap();

        assert!(updated.prayer_asr.is_done());
        assert_eq!(store.find_by_id(log.id).unwrap(), Some(updated.clone()));
        assert_eq!(store.find_by_key("a", day(1)).unwrap(), Some(updated));
        assert!(matches!(
            store.update(99, &LogPatch::new()),
            Err(StoreError::NotFound(99))
        ));
    }

    #[test]
    fn test_find_range_is_inclusive_and_sorted() {
        let store = MemoryStore::new();
        for d in [5, 1, 3, 8] {
            store.insert(NewDailyLog::new("a", day(d))).unwrap();
        }
        store.insert(NewDailyLog::new("b", day(3))).unwrap();

        let dates: Vec<NaiveDate> = store
            .find_range("a", day(1), day(5))
            .unwrap()
            .into_iter()
            .map(|log| log.date)
            .collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
    }

    #[test]
    fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        let log = store.insert(NewDailyLog::new("a", day(1))).unwrap();
        store.set_offline(true);
        assert!(matches!(
            store.find_by_id(log.id),
            Err(StoreError::Unavailable(_))
        ));
        store.set_offline(false);
        store.delete(log.id).unwrap();
        assert_eq!(store.find_by_id(log.id).unwrap(), None);
    }
}
