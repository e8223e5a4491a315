//! Roll-ups derived from stored records. Nothing here writes.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::daily::DailyLog;
use crate::error::Result;
use crate::prayer::{GatedField, HygieneKind, PrayerId};
use crate::store::LogStore;

/// Morning and evening hygiene taken together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HygieneSummary {
    Done,
    Partial,
    NotDone,
}

impl fmt::Display for HygieneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HygieneSummary::Done => "Done",
            HygieneSummary::Partial => "Partial",
            HygieneSummary::NotDone => "Not done",
        })
    }
}

/// One day at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub prayers_done: usize,
    pub hygiene: HygieneSummary,
    pub environment: bool,
    pub exercise: bool,
    pub reading: bool,
    pub languages: bool,
    pub reflection: bool,
}

impl DaySummary {
    pub fn from_log(log: &DailyLog) -> Self {
        let prayers_done = PrayerId::ALL
            .into_iter()
            .filter(|p| log.mark(GatedField::Prayer(*p)).is_done())
            .count();
        let hygiene = match (
            log.hygiene_morning.is_done(),
            log.hygiene_evening.is_done(),
        ) {
            (true, true) => HygieneSummary::Done,
            (false, false) => HygieneSummary::NotDone,
            _ => HygieneSummary::Partial,
        };
        Self {
            date: log.date,
            prayers_done,
            hygiene,
            environment: log.environment_clean(),
            exercise: log.exercise_done(),
            reading: log.reading_done(),
            languages: log.languages_done(),
            reflection: log.reflection.is_some(),
        }
    }

    /// "x/5"
    pub fn prayer_ratio(&self) -> String {
        format!("{}/{}", self.prayers_done, PrayerId::ALL.len())
    }
}

/// Gated absolutes still unchecked, in display order.
pub fn pending_absolutes(log: &DailyLog) -> Vec<GatedField> {
    GatedField::ALL
        .into_iter()
        .filter(|field| !log.mark(*field).is_done())
        .collect()
}

/// Completed count against the possible count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub done: usize,
    pub total: usize,
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.done, self.total)
    }
}

/// Totals over one Sunday-to-Saturday week.
///
/// Totals count only days that have a record: a week with three logged days
/// has fifteen possible prayers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days_logged: usize,
    pub prayers: Tally,
    pub hygiene: Tally,
    pub reading: Tally,
    pub exercise: Tally,
    pub languages: Tally,
    pub environment: Tally,
}

impl WeekSummary {
    /// Sunday and Saturday of the week containing `date`.
    pub fn bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
        (start, start + Duration::days(6))
    }

    pub fn from_logs(start: NaiveDate, end: NaiveDate, logs: &[DailyLog]) -> Self {
        let days = logs.len();
        let count = |pred: fn(&DailyLog) -> bool| logs.iter().filter(|log| pred(log)).count();

        let prayers = logs
            .iter()
            .map(|log| DaySummary::from_log(log).prayers_done)
            .sum();
        let hygiene = logs
            .iter()
            .flat_map(|log| HygieneKind::ALL.map(|k| log.mark(GatedField::Hygiene(k))))
            .filter(|mark| mark.is_done())
            .count();

        let per_day = |done: usize| Tally { done, total: days };
        Self {
            start,
            end,
            days_logged: days,
            prayers: Tally {
                done: prayers,
                total: days * PrayerId::ALL.len(),
            },
            hygiene: Tally {
                done: hygiene,
                total: days * HygieneKind::ALL.len(),
            },
            reading: per_day(count(DailyLog::reading_done)),
            exercise: per_day(count(DailyLog::exercise_done)),
            languages: per_day(count(DailyLog::languages_done)),
            environment: per_day(count(DailyLog::environment_clean)),
        }
    }

    /// Summarise the week containing `date` for `user_id`.
    pub fn for_week<S: LogStore + ?Sized>(
        store: &S,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Self> {
        let (start, end) = Self::bounds(date);
        let logs = store.find_range(user_id, start, end)?;
        Ok(Self::from_logs(start, end, &logs))
    }
}
