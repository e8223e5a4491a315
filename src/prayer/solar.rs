//! Astronomical prayer-time calculation.
//!
//! [`PrayerCalculator`] is the narrow seam the engine depends on: a date and a
//! location go in, six UTC instants come out. [`SolarCalculator`] is the
//! default implementation. Sunrise and sunset come from the `sunrise` crate;
//! the remaining events are hour angles around solar noon for the altitude
//! each one needs (twilight depression for Fajr/Isha, shadow length for Asr).
//!
//! Events the sun never reaches on a given day (polar day, white nights) are
//! reported as [`ComputationError::SunNeverReaches`] rather than defaulted.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tzf_rs::DefaultFinder;

use super::Location;
use super::method::IshaRule;
use crate::common::constants::SUNRISE_ALTITUDE_DEGREES;
use crate::error::ComputationError;

static TZ_FINDER: Lazy<DefaultFinder> = Lazy::new(DefaultFinder::new);

/// Six instants for one date, before timezone conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrayerTimes {
    pub fajr: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub dhuhr: DateTime<Utc>,
    pub asr: DateTime<Utc>,
    pub maghrib: DateTime<Utc>,
    pub isha: DateTime<Utc>,
}

/// Replaceable astronomical calculator.
pub trait PrayerCalculator {
    fn compute(
        &self,
        date: NaiveDate,
        location: &Location,
    ) -> Result<RawPrayerTimes, ComputationError>;
}

/// Default calculator built on the `sunrise` crate and standard solar geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarCalculator;

impl PrayerCalculator for SolarCalculator {
    fn compute(
        &self,
        date: NaiveDate,
        location: &Location,
    ) -> Result<RawPrayerTimes, ComputationError> {
        let latitude = location.latitude;
        let longitude = location.longitude;
        let coord = Coordinates::new(latitude, longitude).ok_or(
            ComputationError::InvalidCoordinates {
                latitude,
                longitude,
            },
        )?;

        let requested = date;
        let date = solar_date(date, location);
        let sun = SunPosition::at_local_noon(date, longitude);
        let noon = solar_noon_hours(&sun, longitude);
        let offset = |event: &'static str, altitude: f64| {
            hour_angle(altitude, sun.declination, latitude).ok_or(
                ComputationError::SunNeverReaches {
                    event,
                    altitude,
                    date: requested,
                },
            )
        };

        // The sunrise crate has no failure signal, so rule out polar days first
        offset("sunrise", SUNRISE_ALTITUDE_DEGREES)?;
        let solar_day = SolarDay::new(coord, date);
        let sunrise = solar_day.event_time(SolarEvent::Sunrise);
        let sunset = solar_day.event_time(SolarEvent::Sunset);

        let method = location.method;
        let fajr = at_hours(date, noon - offset("fajr", -method.fajr_angle())?);
        let dhuhr = at_hours(date, noon);
        let asr_altitude = asr_altitude(
            location.madhab.shadow_factor(),
            sun.declination,
            latitude,
        );
        let asr = at_hours(date, noon + offset("asr", asr_altitude)?);
        let maghrib = sunset;
        let isha = match method.isha_rule() {
            IshaRule::Angle(angle) => at_hours(date, noon + offset("isha", -angle)?),
            IshaRule::MinutesAfterMaghrib(minutes) => maghrib + Duration::minutes(minutes),
        };

        let adjust = method.adjustments();
        let finish = |instant: DateTime<Utc>, minutes: i64| {
            round_to_minute(instant + Duration::minutes(minutes))
        };

        Ok(RawPrayerTimes {
            fajr: finish(fajr, adjust.fajr),
            sunrise: finish(sunrise, adjust.sunrise),
            dhuhr: finish(dhuhr, adjust.dhuhr),
            asr: finish(asr, adjust.asr),
            maghrib: finish(maghrib, adjust.maghrib),
            isha: finish(isha, adjust.isha),
        })
    }
}

/// UTC date whose solar noon at this longitude falls on local `date`.
///
/// Zones far from their solar time (Tonga, Samoa, Kiribati) see solar noon on
/// the neighbouring UTC day, so the calculation has to start from that day.
fn solar_date(date: NaiveDate, location: &Location) -> NaiveDate {
    let sun = SunPosition::at_local_noon(date, location.longitude);
    let noon = at_hours(date, solar_noon_hours(&sun, location.longitude));
    let local = noon.with_timezone(&location.timezone).date_naive();
    date - local.signed_duration_since(date)
}

/// Solar noon in hours after UTC midnight.
fn solar_noon_hours(sun: &SunPosition, longitude: f64) -> f64 {
    fix_hour(12.0 - sun.equation_of_time) - longitude / 15.0
}

/// Timezone for a pair of coordinates, UTC when the lookup has no answer.
pub fn determine_timezone_from_coordinates(latitude: f64, longitude: f64) -> Tz {
    TZ_FINDER
        .get_tz_name(longitude, latitude)
        .parse::<Tz>()
        .unwrap_or(chrono_tz::UTC)
}

/// Solar declination (degrees) and equation of time (hours).
#[derive(Debug, Clone, Copy)]
struct SunPosition {
    declination: f64,
    equation_of_time: f64,
}

impl SunPosition {
    /// Low-precision solar coordinates, evaluated at local solar noon of `date`.
    fn at_local_noon(date: NaiveDate, longitude: f64) -> Self {
        let j2000 = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);
        let days = date.signed_duration_since(j2000).num_days() as f64;
        // J2000.0 is noon on 2000-01-01; shift to noon at this longitude
        let d = days - longitude / 360.0;

        let g = fix_angle(357.529 + 0.985_600_28 * d);
        let q = fix_angle(280.459 + 0.985_647_36 * d);
        let l = fix_angle(q + 1.915 * dsin(g) + 0.020 * dsin(2.0 * g));
        let e = 23.439 - 0.000_000_36 * d;

        let right_ascension = fix_hour(darctan2(dcos(e) * dsin(l), dcos(l)) / 15.0);
        Self {
            declination: darcsin(dsin(e) * dsin(l)),
            equation_of_time: q / 15.0 - right_ascension,
        }
    }
}

/// Hours between solar noon and the moment the sun sits at `altitude`.
///
/// `None` when the sun never reaches that altitude on this day.
fn hour_angle(altitude: f64, declination: f64, latitude: f64) -> Option<f64> {
    let cos_h = (dsin(altitude) - dsin(latitude) * dsin(declination))
        / (dcos(latitude) * dcos(declination));
    if !cos_h.is_finite() || !(-1.0..=1.0).contains(&cos_h) {
        return None;
    }
    Some(darccos(cos_h) / 15.0)
}

/// Altitude at which a shadow is `factor` times its object plus the noon shadow.
fn asr_altitude(factor: f64, declination: f64, latitude: f64) -> f64 {
    let noon_shadow = dtan((latitude - declination).abs());
    (1.0 / (factor + noon_shadow)).atan().to_degrees()
}

fn at_hours(date: NaiveDate, hours: f64) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    midnight + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Round to the nearest minute; 30 seconds rounds up.
fn round_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    let secs = instant.timestamp();
    let rounded = (secs + 30).div_euclid(60) * 60;
    DateTime::from_timestamp(rounded, 0).unwrap_or(instant)
}

fn dsin(d: f64) -> f64 {
    d.to_radians().sin()
}

fn dcos(d: f64) -> f64 {
    d.to_radians().cos()
}

fn dtan(d: f64) -> f64 {
    d.to_radians().tan()
}

fn darcsin(x: f64) -> f64 {
    x.asin().to_degrees()
}

fn darccos(x: f64) -> f64 {
    x.acos().to_degrees()
}

fn darctan2(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

fn fix_angle(a: f64) -> f64 {
    a.rem_euclid(360.0)
}

fn fix_hour(h: f64) -> f64 {
    h.rem_euclid(24.0)
}
