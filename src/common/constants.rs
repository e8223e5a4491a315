//! Application-wide constants: window bounds, defaults and validation limits.

use chrono::{Duration, NaiveTime};

// # Eligibility windows

/// How long after a prayer's start it may still be marked done, in seconds.
///
/// The evening hygiene window also ends this long after isha.
pub const GRACE_PERIOD_SECS: i64 = 2 * 60 * 60;

/// Wall-clock end of the morning hygiene window (inclusive), as (hour, minute, second).
pub const MORNING_HYGIENE_CUTOFF_HMS: (u32, u32, u32) = (11, 59, 0);

pub fn grace_period() -> Duration {
    Duration::seconds(GRACE_PERIOD_SECS)
}

pub fn morning_hygiene_cutoff() -> NaiveTime {
    let (h, m, s) = MORNING_HYGIENE_CUTOFF_HMS;
    NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN)
}

// # Location defaults (Lagos)

pub const DEFAULT_LATITUDE: f64 = 6.5244;
pub const DEFAULT_LONGITUDE: f64 = 3.3792;
pub const DEFAULT_METHOD: &str = "MuslimWorldLeague";
pub const DEFAULT_ASR_MADHAB: &str = "shafi";
pub const DEFAULT_USER_ID: &str = "local";
pub const DEFAULT_DATABASE: &str = "daybook.db";

// # Astronomy

/// Solar altitude at apparent sunrise/sunset, accounting for refraction and the sun's radius.
pub const SUNRISE_ALTITUDE_DEGREES: f64 = -0.833;

// # Payload limits

pub const MINIMUM_PRESENCE: u8 = 1;
pub const MAXIMUM_PRESENCE: u8 = 10;
pub const DEFAULT_PRESENCE: u8 = 5;

// # Config file

pub const CONFIG_DIR_NAME: &str = "daybook";
pub const CONFIG_FILE_NAME: &str = "daybook.toml";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
