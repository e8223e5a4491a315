//! Calculation method identifiers and their parameters.
//!
//! A method fixes the twilight angles used for Fajr and Isha and a small set
//! of per-prayer minute adjustments. Only one method is active per process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How Isha is derived for a method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IshaRule {
    /// Sun this many degrees below the horizon after dusk.
    Angle(f64),
    /// Fixed number of minutes after Maghrib.
    MinutesAfterMaghrib(i64),
}

/// Minute offsets applied after the astronomical calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Adjustments {
    pub fajr: i64,
    pub sunrise: i64,
    pub dhuhr: i64,
    pub asr: i64,
    pub maghrib: i64,
    pub isha: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalculationMethod {
    #[default]
    MuslimWorldLeague,
    Egyptian,
    Karachi,
    NorthAmerica,
    UmmAlQura,
    Dubai,
}

impl CalculationMethod {
    pub const ALL: [CalculationMethod; 6] = [
        CalculationMethod::MuslimWorldLeague,
        CalculationMethod::Egyptian,
        CalculationMethod::Karachi,
        CalculationMethod::NorthAmerica,
        CalculationMethod::UmmAlQura,
        CalculationMethod::Dubai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::MuslimWorldLeague => "MuslimWorldLeague",
            CalculationMethod::Egyptian => "Egyptian",
            CalculationMethod::Karachi => "Karachi",
            CalculationMethod::NorthAmerica => "NorthAmerica",
            CalculationMethod::UmmAlQura => "UmmAlQura",
            CalculationMethod::Dubai => "Dubai",
        }
    }

    /// Degrees below the horizon at Fajr.
    pub fn fajr_angle(&self) -> f64 {
        match self {
            CalculationMethod::MuslimWorldLeague => 18.0,
            CalculationMethod::Egyptian => 19.5,
            CalculationMethod::Karachi => 18.0,
            CalculationMethod::NorthAmerica => 15.0,
            CalculationMethod::UmmAlQura => 18.5,
            CalculationMethod::Dubai => 18.2,
        }
    }

    pub fn isha_rule(&self) -> IshaRule {
        match self {
            CalculationMethod::MuslimWorldLeague => IshaRule::Angle(17.0),
            CalculationMethod::Egyptian => IshaRule::Angle(17.5),
            CalculationMethod::Karachi => IshaRule::Angle(18.0),
            CalculationMethod::NorthAmerica => IshaRule::Angle(15.0),
            CalculationMethod::UmmAlQura => IshaRule::MinutesAfterMaghrib(90),
            CalculationMethod::Dubai => IshaRule::Angle(18.2),
        }
    }

    pub fn adjustments(&self) -> Adjustments {
        match self {
            CalculationMethod::UmmAlQura => Adjustments::default(),
            CalculationMethod::Dubai => Adjustments {
                sunrise: -3,
                dhuhr: 3,
                asr: 3,
                maghrib: 3,
                ..Adjustments::default()
            },
            // Dhuhr is pushed one minute past the zenith
            _ => Adjustments {
                dhuhr: 1,
                ..Adjustments::default()
            },
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalculationMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = CalculationMethod::ALL.iter().map(|m| m.as_str()).collect();
                format!(
                    "unknown calculation method '{s}' (expected one of: {})",
                    known.join(", ")
                )
            })
    }
}

/// School used for the Asr shadow length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsrMadhab {
    #[default]
    Shafi,
    Hanafi,
}

impl AsrMadhab {
    /// Shadow length as a multiple of object height, on top of the noon shadow.
    pub fn shadow_factor(&self) -> f64 {
        match self {
            AsrMadhab::Shafi => 1.0,
            AsrMadhab::Hanafi => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AsrMadhab::Shafi => "shafi",
            AsrMadhab::Hanafi => "hanafi",
        }
    }
}

impl FromStr for AsrMadhab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shafi" | "standard" => Ok(AsrMadhab::Shafi),
            "hanafi" => Ok(AsrMadhab::Hanafi),
            _ => Err(format!("unknown asr madhab '{s}' (expected shafi or hanafi)")),
        }
    }
}
