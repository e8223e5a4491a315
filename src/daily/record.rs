//! The per-day record and the payloads of its ungated fields.
//!
//! Gated fields are [`Mark`]s: a mark is done exactly when it carries a
//! timestamp, so a done flag without a time (or a time without the flag)
//! cannot be represented. Compound ungated fields are `Option`s of their
//! payload, so clearing one drops every associated value together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::constants::{DEFAULT_PRESENCE, MAXIMUM_PRESENCE, MINIMUM_PRESENCE};
use crate::error::PayloadError;
use crate::prayer::{GatedField, HygieneKind, PrayerId};

pub type LogId = i64;

/// Done/not-done state of a gated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "MarkRepr", into = "MarkRepr")]
pub struct Mark(Option<DateTime<Utc>>);

impl Mark {
    pub fn unset() -> Self {
        Mark(None)
    }

    pub fn done_at(instant: DateTime<Utc>) -> Self {
        Mark(Some(instant))
    }

    pub fn is_done(&self) -> bool {
        self.0.is_some()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

/// Wire shape of a mark: the boolean and its timestamp side by side.
#[derive(Serialize, Deserialize)]
struct MarkRepr {
    done: bool,
    done_at: Option<DateTime<Utc>>,
}

impl From<MarkRepr> for Mark {
    fn from(repr: MarkRepr) -> Self {
        if repr.done { Mark(repr.done_at) } else { Mark(None) }
    }
}

impl From<Mark> for MarkRepr {
    fn from(mark: Mark) -> Self {
        MarkRepr {
            done: mark.is_done(),
            done_at: mark.0,
        }
    }
}

/// Key of a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDailyLog {
    pub user_id: String,
    pub date: NaiveDate,
}

impl NewDailyLog {
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
        }
    }
}

/// One day's record for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: LogId,
    pub user_id: String,
    pub date: NaiveDate,
    pub travel_mode_active: bool,

    pub prayer_fajr: Mark,
    pub prayer_dhuhr: Mark,
    pub prayer_asr: Mark,
    pub prayer_maghrib: Mark,
    pub prayer_isha: Mark,
    pub hygiene_morning: Mark,
    pub hygiene_evening: Mark,

    pub environment: Option<EnvironmentCheck>,
    pub exercise: Option<Exercise>,
    pub reading: Option<Reading>,
    pub languages: Option<LanguagePractice>,
    pub reflection: Option<Reflection>,
}

impl DailyLog {
    /// A fresh record with every field unset and travel mode off.
    pub fn new(id: LogId, key: NewDailyLog) -> Self {
        Self {
            id,
            user_id: key.user_id,
            date: key.date,
            travel_mode_active: false,
            prayer_fajr: Mark::unset(),
            prayer_dhuhr: Mark::unset(),
            prayer_asr: Mark::unset(),
            prayer_maghrib: Mark::unset(),
            prayer_isha: Mark::unset(),
            hygiene_morning: Mark::unset(),
            hygiene_evening: Mark::unset(),
            environment: None,
            exercise: None,
            reading: None,
            languages: None,
            reflection: None,
        }
    }

    pub fn mark(&self, field: GatedField) -> Mark {
        match field {
            GatedField::Prayer(PrayerId::Fajr) => self.prayer_fajr,
            GatedField::Prayer(PrayerId::Dhuhr) => self.prayer_dhuhr,
            GatedField::Prayer(PrayerId::Asr) => self.prayer_asr,
            GatedField::Prayer(PrayerId::Maghrib) => self.prayer_maghrib,
            GatedField::Prayer(PrayerId::Isha) => self.prayer_isha,
            GatedField::Hygiene(HygieneKind::Morning) => self.hygiene_morning,
            GatedField::Hygiene(HygieneKind::Evening) => self.hygiene_evening,
        }
    }

    pub fn mark_mut(&mut self, field: GatedField) -> &mut Mark {
        match field {
            GatedField::Prayer(PrayerId::Fajr) => &mut self.prayer_fajr,
            GatedField::Prayer(PrayerId::Dhuhr) => &mut self.prayer_dhuhr,
            GatedField::Prayer(PrayerId::Asr) => &mut self.prayer_asr,
            GatedField::Prayer(PrayerId::Maghrib) => &mut self.prayer_maghrib,
            GatedField::Prayer(PrayerId::Isha) => &mut self.prayer_isha,
            GatedField::Hygiene(HygieneKind::Morning) => &mut self.hygiene_morning,
            GatedField::Hygiene(HygieneKind::Evening) => &mut self.hygiene_evening,
        }
    }

    pub fn environment_clean(&self) -> bool {
        self.environment.is_some()
    }

    pub fn exercise_done(&self) -> bool {
        self.exercise.is_some()
    }

    pub fn reading_done(&self) -> bool {
        self.reading.is_some()
    }

    pub fn languages_done(&self) -> bool {
        self.languages.is_some()
    }

    pub fn is_ungated_set(&self, field: UngatedField) -> bool {
        match field {
            UngatedField::Environment => self.environment_clean(),
            UngatedField::Exercise => self.exercise_done(),
            UngatedField::Reading => self.reading_done(),
            UngatedField::Languages => self.languages_done(),
            UngatedField::Reflection => self.reflection.is_some(),
        }
    }

    /// Store an ungated payload in its slot.
    pub fn put_ungated(&mut self, entry: UngatedEntry) {
        match entry {
            UngatedEntry::Environment(check) => self.environment = Some(check),
            UngatedEntry::Exercise(exercise) => self.exercise = Some(exercise),
            UngatedEntry::Reading(reading) => self.reading = Some(reading),
            UngatedEntry::Languages(practice) => self.languages = Some(practice),
            UngatedEntry::Reflection(reflection) => self.reflection = Some(reflection),
        }
    }

    /// Reset an ungated field and all of its payload.
    pub fn clear_ungated(&mut self, field: UngatedField) {
        match field {
            UngatedField::Environment => self.environment = None,
            UngatedField::Exercise => self.exercise = None,
            UngatedField::Reading => self.reading = None,
            UngatedField::Languages => self.languages = None,
            UngatedField::Reflection => self.reflection = None,
        }
    }
}

/// Environment tidied, with an optional note.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentCheck {
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "duration")]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub text: String,
    pub perspective: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePractice {
    pub languages: Vec<String>,
    pub tool: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

/// Evening reflection, stamped when it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub presence: u8,
    #[serde(default)]
    pub challenges: String,
    #[serde(default)]
    pub truth: String,
    #[serde(default)]
    pub gratitude: String,
    #[serde(default)]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl Reflection {
    /// An empty reflection at the default presence score.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            presence: DEFAULT_PRESENCE,
            challenges: String::new(),
            truth: String::new(),
            gratitude: String::new(),
            notes: String::new(),
            timestamp,
        }
    }
}

/// The ungated absolutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UngatedField {
    Environment,
    Exercise,
    Reading,
    Languages,
    Reflection,
}

impl UngatedField {
    pub const ALL: [UngatedField; 5] = [
        UngatedField::Environment,
        UngatedField::Exercise,
        UngatedField::Reading,
        UngatedField::Languages,
        UngatedField::Reflection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UngatedField::Environment => "environment",
            UngatedField::Exercise => "exercise",
            UngatedField::Reading => "reading",
            UngatedField::Languages => "languages",
            UngatedField::Reflection => "reflection",
        }
    }
}

impl fmt::Display for UngatedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UngatedField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UngatedField::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// A payload for one ungated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "lowercase")]
pub enum UngatedEntry {
    Environment(EnvironmentCheck),
    Exercise(Exercise),
    Reading(Reading),
    Languages(LanguagePractice),
    Reflection(Reflection),
}

impl UngatedEntry {
    pub fn field(&self) -> UngatedField {
        match self {
            UngatedEntry::Environment(_) => UngatedField::Environment,
            UngatedEntry::Exercise(_) => UngatedField::Exercise,
            UngatedEntry::Reading(_) => UngatedField::Reading,
            UngatedEntry::Languages(_) => UngatedField::Languages,
            UngatedEntry::Reflection(_) => UngatedField::Reflection,
        }
    }

    /// Check required values and normalise blank optional text to `None`.
    pub fn validated(self) -> Result<Self, PayloadError> {
        let entry = match self {
            UngatedEntry::Environment(check) => UngatedEntry::Environment(EnvironmentCheck {
                note: non_blank(check.note),
            }),
            UngatedEntry::Exercise(exercise) => {
                let kind = exercise.kind.trim().to_string();
                if kind.is_empty() {
                    return Err(PayloadError::MissingExerciseType);
                }
                if exercise.duration_minutes == Some(0) {
                    return Err(PayloadError::ZeroDuration);
                }
                UngatedEntry::Exercise(Exercise {
                    kind,
                    duration_minutes: exercise.duration_minutes,
                })
            }
            UngatedEntry::Reading(reading) => {
                let text = reading.text.trim().to_string();
                if text.is_empty() {
                    return Err(PayloadError::MissingReadingText);
                }
                UngatedEntry::Reading(Reading {
                    text,
                    perspective: non_blank(reading.perspective),
                })
            }
            UngatedEntry::Languages(practice) => {
                let languages: Vec<String> = practice
                    .languages
                    .iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                if languages.is_empty() {
                    return Err(PayloadError::NoLanguages);
                }
                let tool = practice.tool.trim().to_string();
                if tool.is_empty() {
                    return Err(PayloadError::MissingTool);
                }
                UngatedEntry::Languages(LanguagePractice {
                    languages,
                    tool,
                    activities: practice.activities,
                })
            }
            UngatedEntry::Reflection(reflection) => {
                if !(MINIMUM_PRESENCE..=MAXIMUM_PRESENCE).contains(&reflection.presence) {
                    return Err(PayloadError::PresenceOutOfRange {
                        got: reflection.presence,
                        min: MINIMUM_PRESENCE,
                        max: MAXIMUM_PRESENCE,
                    });
                }
                UngatedEntry::Reflection(reflection)
            }
        };
        Ok(entry)
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log() -> DailyLog {
        DailyLog::new(
            1,
            NewDailyLog::new("user", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
        )
    }

    #[test]
    fn test_new_log_is_all_unset() {
        let log = log();
        assert!(!log.travel_mode_active);
        for field in GatedField::ALL {
            assert!(!log.mark(field).is_done());
            assert_eq!(log.mark(field).timestamp(), None);
        }
        for field in UngatedField::ALL {
            assert!(!log.is_ungated_set(field));
        }
    }

    #[test]
    fn test_mark_serializes_as_flag_and_time() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 4, 2, 0).unwrap();
        let json = serde_json::to_value(Mark::done_at(instant)).unwrap();
        assert_eq!(json["done"], true);
        assert_eq!(json["done_at"], "2024-06-15T04:02:00Z");

        let unset = serde_json::to_value(Mark::unset()).unwrap();
        assert_eq!(unset["done"], false);
        assert!(unset["done_at"].is_null());

        // A stale timestamp on an unset mark is dropped
        let stale: Mark =
            serde_json::from_str(r#"{"done":false,"done_at":"2024-06-15T04:02:00Z"}"#).unwrap();
        assert_eq!(stale, Mark::unset());
    }

    #[test]
    fn test_clear_drops_whole_payload() {
        let mut log = log();
        log.put_ungated(UngatedEntry::Exercise(Exercise {
            kind: "Run".into(),
            duration_minutes: Some(30),
        }));
        assert!(log.exercise_done());
        log.clear_ungated(UngatedField::Exercise);
        assert!(!log.exercise_done());
        assert_eq!(log.exercise, None);
    }

    #[test]
    fn test_validation_rejects_missing_values() {
        let blank_exercise = UngatedEntry::Exercise(Exercise {
            kind: "  ".into(),
            duration_minutes: Some(30),
        });
        assert_eq!(
            blank_exercise.validated(),
            Err(PayloadError::MissingExerciseType)
        );

        let no_tool = UngatedEntry::Languages(LanguagePractice {
            languages: vec!["Arabic".into()],
            tool: String::new(),
            activities: vec![],
        });
        assert_eq!(no_tool.validated(), Err(PayloadError::MissingTool));

        let mut reflection = Reflection::new(Utc::now());
        reflection.presence = 11;
        assert!(matches!(
            UngatedEntry::Reflection(reflection).validated(),
            Err(PayloadError::PresenceOutOfRange { got: 11, .. })
        ));
    }

    #[test]
    fn test_validation_normalises_blank_optionals() {
        let entry = UngatedEntry::Reading(Reading {
            text: " Surah Al-Kahf ".into(),
            perspective: Some("   ".into()),
        })
        .validated()
        .unwrap();
        assert_eq!(
            entry,
            UngatedEntry::Reading(Reading {
                text: "Surah Al-Kahf".into(),
                perspective: None,
            })
        );
    }

    #[test]
    fn test_ungated_field_parsing() {
        assert_eq!("Exercise".parse(), Ok(UngatedField::Exercise));
        assert!("prayer".parse::<UngatedField>().is_err());
    }
}
