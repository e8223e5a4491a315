//! Command handlers for the daybook binary.
//!
//! Each command lives in its own submodule and runs against a
//! [`CommandContext`]: the engine, the store, the user and the instant the
//! command is evaluated at.

pub mod entry;
pub mod help;
pub mod status;
pub mod times;
pub mod week;

use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;

use crate::args::Command;
use crate::daily::DailyLogStateMachine;
use crate::prayer::PrayerTimeEngine;
use crate::store::LogStore;

/// Everything a command needs to run.
pub struct CommandContext {
    pub engine: PrayerTimeEngine,
    pub store: Box<dyn LogStore>,
    pub user_id: String,
    /// The instant the command is evaluated at, in the location's timezone.
    pub now: DateTime<Tz>,
}

impl CommandContext {
    /// State machine over today's record, created on first use.
    pub fn machine(&self) -> Result<DailyLogStateMachine<'_, dyn LogStore>> {
        Ok(DailyLogStateMachine::for_today(
            self.store.as_ref(),
            &self.engine,
            &self.user_id,
            &self.now,
        )?)
    }
}

/// Run `command` against `ctx`.
pub fn run_command(ctx: &CommandContext, command: Command) -> Result<()> {
    match command {
        Command::Times { date } => times::handle_times_command(ctx, date.as_deref()),
        Command::Next => times::handle_next_command(ctx),
        Command::Status => status::handle_status_command(ctx),
        Command::Toggle { field } => entry::handle_toggle_command(ctx, field),
        Command::Travel => entry::handle_travel_command(ctx),
        Command::Exercise { kind, minutes } => entry::handle_exercise_command(ctx, kind, minutes),
        Command::Reading { text, perspective } => {
            entry::handle_reading_command(ctx, text, perspective)
        }
        Command::Environment { note } => entry::handle_environment_command(ctx, note),
        Command::Languages {
            languages,
            tool,
            activities,
        } => entry::handle_languages_command(ctx, languages, tool, activities),
        Command::Reflect { presence, notes } => entry::handle_reflect_command(ctx, presence, notes),
        Command::Clear { field } => entry::handle_clear_command(ctx, field),
        Command::Week => week::handle_week_command(ctx),
    }
}

/// Compact duration such as `2h5m`, `45m` or `30s`.
pub(crate) fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        if minutes > 0 {
            format!("{hours}h{minutes}m")
        } else {
            format!("{hours}h")
        }
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}
