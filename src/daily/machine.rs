//! Write-through state machine over one day's record.
//!
//! Every mutation goes to the store first. The in-memory copy is replaced
//! with what the store returns, and only once the store has confirmed, so a
//! failed write leaves the machine exactly as it was.
//!
//! Gated toggles re-read the record before deciding, which keeps the travel
//! flag and the current mark honest when another writer changed the row.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::daily::{DailyLog, Mark, UngatedEntry, UngatedField};
use crate::error::{DaybookError, Result};
use crate::prayer::{GatedField, PrayerCalculator, PrayerTimeEngine, SolarCalculator};
use crate::store::{self, LogPatch, LogStore};

pub struct DailyLogStateMachine<'a, S: LogStore + ?Sized, C: PrayerCalculator = SolarCalculator> {
    store: &'a S,
    engine: &'a PrayerTimeEngine<C>,
    log: DailyLog,
}

impl<'a, S: LogStore + ?Sized, C: PrayerCalculator> DailyLogStateMachine<'a, S, C> {
    /// Load the record for (user, date), creating it when it does not exist.
    pub fn get_or_create(
        store: &'a S,
        engine: &'a PrayerTimeEngine<C>,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Self> {
        let log = store::get_or_create(store, user_id, date)?;
        Ok(Self { store, engine, log })
    }

    /// Load today's record, where today is `now`'s date at the location.
    pub fn for_today<Z: TimeZone>(
        store: &'a S,
        engine: &'a PrayerTimeEngine<C>,
        user_id: &str,
        now: &DateTime<Z>,
    ) -> Result<Self> {
        Self::get_or_create(store, engine, user_id, engine.local_date(now))
    }

    pub fn log(&self) -> &DailyLog {
        &self.log
    }

    fn fetch(&self) -> Result<DailyLog> {
        let id = self.log.id;
        self.store
            .find_by_id(id)
            .inspect_err(|e| log_error!("Reading daily log {id} failed: {e}"))?
            .ok_or(DaybookError::NotFound(id))
    }

    fn write(&mut self, patch: LogPatch) -> Result<&DailyLog> {
        let id = self.log.id;
        self.log = self
            .store
            .update(id, &patch)
            .inspect_err(|e| log_error!("Writing daily log {id} failed: {e}"))?;
        Ok(&self.log)
    }

    /// Flip a prayer or hygiene field, if its window allows it at `now`.
    ///
    /// Unchecking is gated the same way as checking. Without travel mode,
    /// `now` must also fall on the record's own date at the location.
    pub fn toggle_gated<Z: TimeZone>(
        &mut self,
        field: GatedField,
        now: &DateTime<Z>,
    ) -> Result<&DailyLog> {
        let current = self.fetch()?;
        let travel = current.travel_mode_active;

        let same_day = self.engine.local_date(now) == current.date;
        if !travel && !(same_day && self.engine.is_field_eligible(field, now, false)?) {
            let window = self.engine.window_for(field, current.date)?;
            let status = window.status(now);
            log_warning!("Rejected {field} toggle for {}: {status}", current.date);
            return Err(DaybookError::IneligibleWindow {
                field,
                window,
                status,
            });
        }

        let mark = if current.mark(field).is_done() {
            Mark::unset()
        } else {
            Mark::done_at(now.with_timezone(&Utc))
        };
        log_debug!(
            "{field} -> {}{}",
            if mark.is_done() { "done" } else { "not done" },
            if travel { " (travel mode)" } else { "" }
        );
        self.write(LogPatch::new().gated(field, mark))
    }

    /// Flip travel mode. Never gated.
    pub fn toggle_travel_mode(&mut self) -> Result<&DailyLog> {
        let current = self.fetch()?;
        let active = !current.travel_mode_active;
        log_debug!("Travel mode {}", if active { "on" } else { "off" });
        self.write(LogPatch::new().travel_mode(active))
    }

    /// Mark an ungated field done with its payload. Never gated.
    pub fn set_ungated(&mut self, entry: UngatedEntry) -> Result<&DailyLog> {
        let entry = entry.validated()?;
        log_debug!("Recorded {}", entry.field());
        self.write(LogPatch::new().ungated(entry))
    }

    /// Reset an ungated field and every associated value.
    pub fn clear_ungated(&mut self, field: UngatedField) -> Result<&DailyLog> {
        log_debug!("Cleared {field}");
        self.write(LogPatch::new().cleared(field))
    }
}
