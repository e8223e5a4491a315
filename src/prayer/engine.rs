//! Prayer-time eligibility engine.
//!
//! [`PrayerTimeEngine`] owns the fixed location and a calculator, and answers
//! every question the rest of the crate asks about time windows:
//!
//! | Field            | Window (both ends inclusive)          |
//! |------------------|---------------------------------------|
//! | fajr             | `[fajr, sunrise]`                     |
//! | dhuhr..isha      | `[prayer, prayer + 2h]`               |
//! | morning hygiene  | `[fajr, 11:59:00 local]`              |
//! | evening hygiene  | `[maghrib, isha + 2h]`                |
//!
//! Times are recomputed for the calendar date of the instant being checked,
//! in the location's timezone. Nothing is cached across calls, so a check at
//! 00:30 is judged against the new day's schedule. Travel mode short-circuits
//! every check to eligible without touching the calculator.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;

use super::solar::{PrayerCalculator, SolarCalculator};
use super::{GatedField, HygieneKind, Location, PrayerId, PrayerInstants, Window, WindowStatus};
use crate::common::constants::{grace_period, morning_hygiene_cutoff};
use crate::error::ComputationError;

#[derive(Debug, Clone)]
pub struct PrayerTimeEngine<C = SolarCalculator> {
    location: Location,
    calculator: C,
}

impl PrayerTimeEngine<SolarCalculator> {
    pub fn new(location: Location) -> Self {
        Self::with_calculator(location, SolarCalculator)
    }
}

impl<C: PrayerCalculator> PrayerTimeEngine<C> {
    pub fn with_calculator(location: Location, calculator: C) -> Self {
        Self {
            location,
            calculator,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn timezone(&self) -> Tz {
        self.location.timezone
    }

    /// Calendar date of `now` at the location.
    pub fn local_date<Z: TimeZone>(&self, now: &DateTime<Z>) -> NaiveDate {
        now.with_timezone(&self.location.timezone).date_naive()
    }

    /// Compute the six instants for `date`.
    ///
    /// Fails when the calculator cannot place an event, places one on another
    /// local day, or returns instants that are not strictly increasing.
    pub fn compute_times(&self, date: NaiveDate) -> Result<PrayerInstants, ComputationError> {
        let raw = self.calculator.compute(date, &self.location)?;
        let tz = self.location.timezone;
        let times = PrayerInstants {
            date,
            fajr: raw.fajr.with_timezone(&tz),
            sunrise: raw.sunrise.with_timezone(&tz),
            dhuhr: raw.dhuhr.with_timezone(&tz),
            asr: raw.asr.with_timezone(&tz),
            maghrib: raw.maghrib.with_timezone(&tz),
            isha: raw.isha.with_timezone(&tz),
        };

        let sequence = times.sequence();
        if let Some((event, instant)) = sequence.iter().find(|(_, at)| at.date_naive() != date) {
            return Err(ComputationError::OutsideDay {
                event: *event,
                date,
                actual: instant.date_naive(),
            });
        }
        if let Some(pair) = sequence.windows(2).find(|pair| pair[0].1 >= pair[1].1) {
            return Err(ComputationError::NonMonotonic {
                date,
                detail: format!(
                    "{} {} is not before {} {}",
                    pair[0].0,
                    pair[0].1.format("%H:%M"),
                    pair[1].0,
                    pair[1].1.format("%H:%M")
                ),
            });
        }

        Ok(times)
    }

    /// The window during which `field` may change on `date`.
    pub fn window_for(
        &self,
        field: GatedField,
        date: NaiveDate,
    ) -> Result<Window, ComputationError> {
        let times = self.compute_times(date)?;
        self.window_from(&times, field)
    }

    fn window_from(
        &self,
        times: &PrayerInstants,
        field: GatedField,
    ) -> Result<Window, ComputationError> {
        let window = match field {
            GatedField::Prayer(PrayerId::Fajr) => Window {
                opens: times.fajr,
                closes: times.sunrise,
            },
            GatedField::Prayer(prayer) => {
                let opens = times.get(prayer);
                Window {
                    opens,
                    closes: opens + grace_period(),
                }
            }
            GatedField::Hygiene(HygieneKind::Morning) => {
                let cutoff = self
                    .location
                    .timezone
                    .from_local_datetime(&times.date.and_time(morning_hygiene_cutoff()))
                    .single()
                    .ok_or(ComputationError::AmbiguousLocalTime {
                        event: "morning hygiene cutoff",
                        date: times.date,
                    })?;
                Window {
                    opens: times.fajr,
                    closes: cutoff,
                }
            }
            GatedField::Hygiene(HygieneKind::Evening) => Window {
                opens: times.maghrib,
                closes: times.isha + grace_period(),
            },
        };
        Ok(window)
    }

    /// Whether `field` may be toggled at `now`.
    pub fn is_field_eligible<Z: TimeZone>(
        &self,
        field: GatedField,
        now: &DateTime<Z>,
        travel_mode_active: bool,
    ) -> Result<bool, ComputationError> {
        if travel_mode_active {
            return Ok(true);
        }
        let window = self.window_for(field, self.local_date(now))?;
        Ok(window.contains(now))
    }

    /// Whether `prayer` may be marked at `now`.
    pub fn is_eligible<Z: TimeZone>(
        &self,
        prayer: PrayerId,
        now: &DateTime<Z>,
        travel_mode_active: bool,
    ) -> Result<bool, ComputationError> {
        self.is_field_eligible(GatedField::Prayer(prayer), now, travel_mode_active)
    }

    /// Whether hygiene of `kind` may be marked at `now`.
    pub fn is_eligible_hygiene<Z: TimeZone>(
        &self,
        kind: HygieneKind,
        now: &DateTime<Z>,
        travel_mode_active: bool,
    ) -> Result<bool, ComputationError> {
        self.is_field_eligible(GatedField::Hygiene(kind), now, travel_mode_active)
    }

    /// The window for `field` on `now`'s date and where `now` falls in it.
    pub fn window_status<Z: TimeZone>(
        &self,
        field: GatedField,
        now: &DateTime<Z>,
    ) -> Result<(Window, WindowStatus), ComputationError> {
        let window = self.window_for(field, self.local_date(now))?;
        let status = window.status(now);
        Ok((window, status))
    }

    /// First prayer strictly after `now`, rolling over to the next day's fajr.
    pub fn next_prayer<Z: TimeZone>(
        &self,
        now: &DateTime<Z>,
    ) -> Result<(PrayerId, DateTime<Tz>), ComputationError> {
        let now = now.with_timezone(&self.location.timezone);
        let today = now.date_naive();
        let times = self.compute_times(today)?;

        if let Some(next) = PrayerId::ALL
            .into_iter()
            .map(|prayer| (prayer, times.get(prayer)))
            .find(|(_, instant)| *instant > now)
        {
            return Ok(next);
        }

        let tomorrow = today + Duration::days(1);
        let tomorrow_times = self.compute_times(tomorrow)?;
        Ok((PrayerId::Fajr, tomorrow_times.fajr))
    }
}
