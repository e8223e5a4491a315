//! `times` and `next`: the day's schedule and what comes next.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::{CommandContext, format_duration};
use crate::prayer::{GatedField, PrayerId};

pub fn handle_times_command(ctx: &CommandContext, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{text}', expected YYYY-MM-DD"))?,
        None => ctx.now.date_naive(),
    };
    let times = ctx.engine.compute_times(date)?;
    let location = ctx.engine.location();

    log_block_start!(
        "Prayer times for {} ({}, {})",
        date,
        location.timezone,
        location.method
    );
    for (name, instant) in times.sequence() {
        log_indented!("{:<8} {}", name, instant.format("%H:%M"));
    }

    log_block_start!("Windows:");
    for field in GatedField::ALL {
        let window = ctx.engine.window_for(field, date)?;
        let marker = if date == ctx.now.date_naive() {
            format!("  {}", window.status(&ctx.now))
        } else {
            String::new()
        };
        log_indented!("{:<16} {}{}", field.to_string(), window, marker);
    }
    log_end!();
    Ok(())
}

pub fn handle_next_command(ctx: &CommandContext) -> Result<()> {
    let (prayer, at) = ctx.engine.next_prayer(&ctx.now)?;
    let wait = (at - ctx.now).num_seconds().max(0) as u64;
    let day = if at.date_naive() == ctx.now.date_naive() {
        ""
    } else {
        " tomorrow"
    };

    log_block_start!(
        "Next prayer: {} at {}{} (in {})",
        capitalize(prayer),
        at.format("%H:%M"),
        day,
        format_duration(wait)
    );
    log_end!();
    Ok(())
}

fn capitalize(prayer: PrayerId) -> String {
    let name = prayer.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
