//! Prayer times and the eligibility windows they define.
//!
//! ## Module Structure
//!
//! - [`method`]: Calculation methods (twilight angles, adjustments) and the Asr madhab
//! - [`solar`]: The astronomical calculator behind the narrow [`PrayerCalculator`] seam,
//!   plus timezone resolution from coordinates
//! - [`engine`]: [`PrayerTimeEngine`], the single place where window math lives
//!
//! All instants are kept as `DateTime<Tz>` in the location's timezone so that
//! comparisons carry full date information and never confuse today with tomorrow.

pub mod engine;
pub mod method;
pub mod solar;

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use engine::PrayerTimeEngine;
pub use method::{AsrMadhab, CalculationMethod};
pub use solar::{PrayerCalculator, RawPrayerTimes, SolarCalculator};

#[cfg(test)]
mod tests;

/// One of the five daily prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerId {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerId {
    /// The five prayers in daily order.
    pub const ALL: [PrayerId; 5] = [
        PrayerId::Fajr,
        PrayerId::Dhuhr,
        PrayerId::Asr,
        PrayerId::Maghrib,
        PrayerId::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerId::Fajr => "fajr",
            PrayerId::Dhuhr => "dhuhr",
            PrayerId::Asr => "asr",
            PrayerId::Maghrib => "maghrib",
            PrayerId::Isha => "isha",
        }
    }
}

impl fmt::Display for PrayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrayerId::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown prayer '{s}'"))
    }
}

/// Morning or evening hygiene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HygieneKind {
    Morning,
    Evening,
}

impl HygieneKind {
    pub const ALL: [HygieneKind; 2] = [HygieneKind::Morning, HygieneKind::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            HygieneKind::Morning => "morning",
            HygieneKind::Evening => "evening",
        }
    }
}

/// An absolute whose toggle is restricted to a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatedField {
    Prayer(PrayerId),
    Hygiene(HygieneKind),
}

impl GatedField {
    /// All seven gated absolutes in display order.
    pub const ALL: [GatedField; 7] = [
        GatedField::Prayer(PrayerId::Fajr),
        GatedField::Prayer(PrayerId::Dhuhr),
        GatedField::Prayer(PrayerId::Asr),
        GatedField::Prayer(PrayerId::Maghrib),
        GatedField::Prayer(PrayerId::Isha),
        GatedField::Hygiene(HygieneKind::Morning),
        GatedField::Hygiene(HygieneKind::Evening),
    ];

    /// Column name of the boolean in the daily log table.
    pub fn column(&self) -> &'static str {
        match self {
            GatedField::Prayer(PrayerId::Fajr) => "prayer_fajr",
            GatedField::Prayer(PrayerId::Dhuhr) => "prayer_dhuhr",
            GatedField::Prayer(PrayerId::Asr) => "prayer_asr",
            GatedField::Prayer(PrayerId::Maghrib) => "prayer_maghrib",
            GatedField::Prayer(PrayerId::Isha) => "prayer_isha",
            GatedField::Hygiene(HygieneKind::Morning) => "hygiene_morning",
            GatedField::Hygiene(HygieneKind::Evening) => "hygiene_evening",
        }
    }
}

impl fmt::Display for GatedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatedField::Prayer(prayer) => write!(f, "{prayer}"),
            GatedField::Hygiene(kind) => write!(f, "{} hygiene", kind.as_str()),
        }
    }
}

impl FromStr for GatedField {
    type Err = String;

    /// Accepts bare names (`fajr`, `morning`) and column names (`prayer_fajr`, `hygiene_morning`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if let Some(field) = GatedField::ALL.into_iter().find(|f| f.column() == lower) {
            return Ok(field);
        }
        if let Ok(prayer) = lower.parse::<PrayerId>() {
            return Ok(GatedField::Prayer(prayer));
        }
        HygieneKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .map(GatedField::Hygiene)
            .ok_or_else(|| format!("unknown gated field '{s}'"))
    }
}

/// The fixed place and method prayer times are computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub method: CalculationMethod,
    pub madhab: AsrMadhab,
    pub timezone: Tz,
}

impl Location {
    pub fn new(
        latitude: f64,
        longitude: f64,
        method: CalculationMethod,
        madhab: AsrMadhab,
        timezone: Tz,
    ) -> Self {
        Self {
            latitude,
            longitude,
            method,
            madhab,
            timezone,
        }
    }

    /// Build a location, deriving the timezone from the coordinates when none is given.
    pub fn resolve(
        latitude: f64,
        longitude: f64,
        method: CalculationMethod,
        madhab: AsrMadhab,
        timezone: Option<Tz>,
    ) -> Self {
        let timezone = timezone
            .unwrap_or_else(|| solar::determine_timezone_from_coordinates(latitude, longitude));
        Self::new(latitude, longitude, method, madhab, timezone)
    }
}

/// The six instants of one calendar day, strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerInstants {
    pub date: NaiveDate,
    pub fajr: DateTime<Tz>,
    pub sunrise: DateTime<Tz>,
    pub dhuhr: DateTime<Tz>,
    pub asr: DateTime<Tz>,
    pub maghrib: DateTime<Tz>,
    pub isha: DateTime<Tz>,
}

impl PrayerInstants {
    pub fn get(&self, prayer: PrayerId) -> DateTime<Tz> {
        match prayer {
            PrayerId::Fajr => self.fajr,
            PrayerId::Dhuhr => self.dhuhr,
            PrayerId::Asr => self.asr,
            PrayerId::Maghrib => self.maghrib,
            PrayerId::Isha => self.isha,
        }
    }

    /// All six instants with their names, in order.
    pub fn sequence(&self) -> [(&'static str, DateTime<Tz>); 6] {
        [
            ("fajr", self.fajr),
            ("sunrise", self.sunrise),
            ("dhuhr", self.dhuhr),
            ("asr", self.asr),
            ("maghrib", self.maghrib),
            ("isha", self.isha),
        ]
    }
}

/// A closed interval `[opens, closes]` during which a gated field may change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub opens: DateTime<Tz>,
    pub closes: DateTime<Tz>,
}

impl Window {
    /// Both ends are inclusive.
    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        let instant = instant.with_timezone(&self.opens.timezone());
        self.opens <= instant && instant <= self.closes
    }

    /// Where `instant` falls relative to this window.
    pub fn status<Z: TimeZone>(&self, instant: &DateTime<Z>) -> WindowStatus {
        let instant = instant.with_timezone(&self.opens.timezone());
        if instant < self.opens {
            WindowStatus::NotYetOpen { opens: self.opens }
        } else if instant > self.closes {
            WindowStatus::Closed {
                closed: self.closes,
            }
        } else {
            WindowStatus::Open {
                closes: self.closes,
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {}",
            self.opens.format("%H:%M"),
            self.closes.format("%H:%M")
        )
    }
}

/// User-facing position of an instant relative to a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowStatus {
    NotYetOpen { opens: DateTime<Tz> },
    Open { closes: DateTime<Tz> },
    Closed { closed: DateTime<Tz> },
}

impl WindowStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, WindowStatus::Open { .. })
    }
}

impl fmt::Display for WindowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowStatus::NotYetOpen { opens } => write!(f, "opens at {}", opens.format("%H:%M")),
            WindowStatus::Open { closes } => write!(f, "open until {}", closes.format("%H:%M")),
            WindowStatus::Closed { closed } => {
                write!(f, "window closed at {}", closed.format("%H:%M"))
            }
        }
    }
}
