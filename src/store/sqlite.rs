//! SQLite-backed log store.
//!
//! One row per (user, date) in `daily_logs`. Gated fields are a flag column
//! plus a nullable RFC 3339 timestamp column. Compound ungated payloads are
//! flattened into columns, except languages and reflection which are stored
//! as JSON documents.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{LogPatch, LogStore};
use crate::daily::{
    DailyLog, EnvironmentCheck, Exercise, LanguagePractice, LogId, Mark, NewDailyLog, Reading,
    Reflection,
};
use crate::error::StoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT id, user_id, date, travel_mode_active,
        prayer_fajr, prayer_fajr_time, prayer_dhuhr, prayer_dhuhr_time,
        prayer_asr, prayer_asr_time, prayer_maghrib, prayer_maghrib_time,
        prayer_isha, prayer_isha_time,
        hygiene_morning, hygiene_morning_time, hygiene_evening, hygiene_evening_time,
        environment_clean, environment_note,
        exercise_done, exercise_type, exercise_duration,
        reading_done, reading_text, reading_perspective,
        languages_done, languages_data, reflection_data
    FROM daily_logs";

/// Durable store on a single SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".into()))
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS daily_logs (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id              TEXT NOT NULL,
            date                 TEXT NOT NULL,
            travel_mode_active   INTEGER NOT NULL DEFAULT 0,
            prayer_fajr          INTEGER NOT NULL DEFAULT 0,
            prayer_fajr_time     TEXT,
            prayer_dhuhr         INTEGER NOT NULL DEFAULT 0,
            prayer_dhuhr_time    TEXT,
            prayer_asr           INTEGER NOT NULL DEFAULT 0,
            prayer_asr_time      TEXT,
            prayer_maghrib       INTEGER NOT NULL DEFAULT 0,
            prayer_maghrib_time  TEXT,
            prayer_isha          INTEGER NOT NULL DEFAULT 0,
            prayer_isha_time     TEXT,
            hygiene_morning      INTEGER NOT NULL DEFAULT 0,
            hygiene_morning_time TEXT,
            hygiene_evening      INTEGER NOT NULL DEFAULT 0,
            hygiene_evening_time TEXT,
            environment_clean    INTEGER NOT NULL DEFAULT 0,
            environment_note     TEXT,
            exercise_done        INTEGER NOT NULL DEFAULT 0,
            exercise_type        TEXT,
            exercise_duration    INTEGER,
            reading_done         INTEGER NOT NULL DEFAULT 0,
            reading_text         TEXT,
            reading_perspective  TEXT,
            languages_done       INTEGER NOT NULL DEFAULT 0,
            languages_data       TEXT,
            reflection_data      TEXT,
            UNIQUE (user_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_daily_logs_user_date ON daily_logs(user_id, date);",
    )
}

/// Raw column values for one row, before they are checked.
struct LogRow {
    id: LogId,
    user_id: String,
    date: String,
    travel_mode_active: bool,
    marks: [(bool, Option<String>); 7],
    environment_clean: bool,
    environment_note: Option<String>,
    exercise_done: bool,
    exercise_type: Option<String>,
    exercise_duration: Option<u32>,
    reading_done: bool,
    reading_text: Option<String>,
    reading_perspective: Option<String>,
    languages_done: bool,
    languages_data: Option<String>,
    reflection_data: Option<String>,
}

impl LogRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mark = |flag: usize| -> rusqlite::Result<(bool, Option<String>)> {
            Ok((row.get(flag)?, row.get(flag + 1)?))
        };
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: row.get(2)?,
            travel_mode_active: row.get(3)?,
            marks: [
                mark(4)?,
                mark(6)?,
                mark(8)?,
                mark(10)?,
                mark(12)?,
                mark(14)?,
                mark(16)?,
            ],
            environment_clean: row.get(18)?,
            environment_note: row.get(19)?,
            exercise_done: row.get(20)?,
            exercise_type: row.get(21)?,
            exercise_duration: row.get(22)?,
            reading_done: row.get(23)?,
            reading_text: row.get(24)?,
            reading_perspective: row.get(25)?,
            languages_done: row.get(26)?,
            languages_data: row.get(27)?,
            reflection_data: row.get(28)?,
        })
    }

    fn into_log(self) -> Result<DailyLog, StoreError> {
        let id = self.id;
        let corrupt = |detail: String| StoreError::Corrupt { id, detail };

        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| corrupt(format!("date '{}': {e}", self.date)))?;

        let mut marks = [Mark::unset(); 7];
        for (slot, (done, time)) in marks.iter_mut().zip(self.marks) {
            *slot = match (done, time) {
                (false, _) => Mark::unset(),
                (true, Some(time)) => Mark::done_at(
                    DateTime::parse_from_rfc3339(&time)
                        .map_err(|e| corrupt(format!("timestamp '{time}': {e}")))?
                        .with_timezone(&Utc),
                ),
                (true, None) => return Err(corrupt("checked field has no timestamp".into())),
            };
        }
        let [fajr, dhuhr, asr, maghrib, isha, morning, evening] = marks;

        let exercise = match (self.exercise_done, self.exercise_type) {
            (false, _) => None,
            (true, Some(kind)) => Some(Exercise {
                kind,
                duration_minutes: self.exercise_duration,
            }),
            (true, None) => return Err(corrupt("exercise has no type".into())),
        };

        let reading = match (self.reading_done, self.reading_text) {
            (false, _) => None,
            (true, Some(text)) => Some(Reading {
                text,
                perspective: self.reading_perspective,
            }),
            (true, None) => return Err(corrupt("reading has no text".into())),
        };

        let languages = match (self.languages_done, self.languages_data) {
            (false, _) => None,
            (true, Some(json)) => Some(serde_json::from_str::<LanguagePractice>(&json)?),
            (true, None) => return Err(corrupt("languages practice has no data".into())),
        };

        let reflection = self
            .reflection_data
            .map(|json| serde_json::from_str::<Reflection>(&json))
            .transpose()?;

        Ok(DailyLog {
            id,
            user_id: self.user_id,
            date,
            travel_mode_active: self.travel_mode_active,
            prayer_fajr: fajr,
            prayer_dhuhr: dhuhr,
            prayer_asr: asr,
            prayer_maghrib: maghrib,
            prayer_isha: isha,
            hygiene_morning: morning,
            hygiene_evening: evening,
            environment: self.environment_clean.then_some(EnvironmentCheck {
                note: self.environment_note,
            }),
            exercise,
            reading,
            languages,
            reflection,
        })
    }
}

fn mark_columns(mark: Mark) -> (bool, Option<String>) {
    (mark.is_done(), mark.timestamp().map(|t| t.to_rfc3339()))
}

fn select_one(
    conn: &Connection,
    clause: &str,
    params: impl rusqlite::Params,
) -> Result<Option<DailyLog>, StoreError> {
    conn.query_row(&format!("{SELECT_COLUMNS} {clause}"), params, LogRow::from_row)
        .optional()?
        .map(LogRow::into_log)
        .transpose()
}

fn write_log(tx: &Transaction<'_>, log: &DailyLog) -> Result<(), StoreError> {
    let (fajr, fajr_time) = mark_columns(log.prayer_fajr);
    let (dhuhr, dhuhr_time) = mark_columns(log.prayer_dhuhr);
    let (asr, asr_time) = mark_columns(log.prayer_asr);
    let (maghrib, maghrib_time) = mark_columns(log.prayer_maghrib);
    let (isha, isha_time) = mark_columns(log.prayer_isha);
    let (morning, morning_time) = mark_columns(log.hygiene_morning);
    let (evening, evening_time) = mark_columns(log.hygiene_evening);

    let languages_data = log
        .languages
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let reflection_data = log
        .reflection
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    tx.execute(
        "UPDATE daily_logs SET
            travel_mode_active = ?2,
            prayer_fajr = ?3, prayer_fajr_time = ?4,
            prayer_dhuhr = ?5, prayer_dhuhr_time = ?6,
            prayer_asr = ?7, prayer_asr_time = ?8,
            prayer_maghrib = ?9, prayer_maghrib_time = ?10,
            prayer_isha = ?11, prayer_isha_time = ?12,
            hygiene_morning = ?13, hygiene_morning_time = ?14,
            hygiene_evening = ?15, hygiene_evening_time = ?16,
            environment_clean = ?17, environment_note = ?18,
            exercise_done = ?19, exercise_type = ?20, exercise_duration = ?21,
            reading_done = ?22, reading_text = ?23, reading_perspective = ?24,
            languages_done = ?25, languages_data = ?26,
            reflection_data = ?27
         WHERE id = ?1",
        params![
            log.id,
            log.travel_mode_active,
            fajr,
            fajr_time,
            dhuhr,
            dhuhr_time,
            asr,
            asr_time,
            maghrib,
            maghrib_time,
            isha,
            isha_time,
            morning,
            morning_time,
            evening,
            evening_time,
            log.environment_clean(),
            log.environment.as_ref().and_then(|e| e.note.as_deref()),
            log.exercise_done(),
            log.exercise.as_ref().map(|e| e.kind.as_str()),
            log.exercise.as_ref().and_then(|e| e.duration_minutes),
            log.reading_done(),
            log.reading.as_ref().map(|r| r.text.as_str()),
            log.reading.as_ref().and_then(|r| r.perspective.as_deref()),
            log.languages_done(),
            languages_data,
            reflection_data,
        ],
    )?;
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl LogStore for SqliteStore {
    fn find_by_key(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyLog>, StoreError> {
        let conn = self.lock()?;
        select_one(
            &conn,
            "WHERE user_id = ?1 AND date = ?2",
            params![user_id, date.format(DATE_FORMAT).to_string()],
        )
    }

    fn find_by_id(&self, id: LogId) -> Result<Option<DailyLog>, StoreError> {
        let conn = self.lock()?;
        select_one(&conn, "WHERE id = ?1", params![id])
    }

    fn find_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyLog>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND date >= ?2 AND date <= ?3 ORDER BY date"
        ))?;
        let rows = stmt.query_map(
            params![
                user_id,
                from.format(DATE_FORMAT).to_string(),
                to.format(DATE_FORMAT).to_string()
            ],
            LogRow::from_row,
        )?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.into_log()?);
        }
        Ok(logs)
    }

    fn insert(&self, new: NewDailyLog) -> Result<DailyLog, StoreError> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO daily_logs (user_id, date) VALUES (?1, ?2)",
            params![new.user_id, new.date.format(DATE_FORMAT).to_string()],
        );
        match inserted {
            Ok(_) => Ok(DailyLog::new(conn.last_insert_rowid(), new)),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict {
                user_id: new.user_id,
                date: new.date,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, id: LogId, patch: &LogPatch) -> Result<DailyLog, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut log = select_one(&tx, "WHERE id = ?1", params![id])?.ok_or(StoreError::NotFound(id))?;
        patch.apply(&mut log);
        write_log(&tx, &log)?;
        tx.commit()?;
        Ok(log)
    }

    fn delete(&self, id: LogId) -> Result<(), StoreError> {
        let conn = self.lock()?;
        match conn.execute("DELETE FROM daily_logs WHERE id = ?1", params![id])? {
            0 => Err(StoreError::NotFound(id)),
            _ => Ok(()),
        }
    }
}
