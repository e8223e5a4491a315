//! Daily records and the state machine that mutates them.
//!
//! ## Module Structure
//!
//! - [`record`]: [`DailyLog`], its gated [`Mark`]s and ungated payloads
//! - [`machine`]: [`DailyLogStateMachine`], the only writer of a record
//! - [`summary`]: Day and week roll-ups derived from stored records

pub mod machine;
pub mod record;
pub mod summary;

pub use machine::DailyLogStateMachine;
pub use record::{
    DailyLog, EnvironmentCheck, Exercise, LanguagePractice, LogId, Mark, NewDailyLog, Reading,
    Reflection, UngatedEntry, UngatedField,
};
pub use summary::{DaySummary, HygieneSummary, Tally, WeekSummary, pending_absolutes};
