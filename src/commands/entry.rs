//! Commands that change today's record.

use anyhow::Result;
use chrono::Utc;

use super::CommandContext;
use crate::daily::{
    EnvironmentCheck, Exercise, LanguagePractice, Reading, Reflection, UngatedEntry, UngatedField,
};
use crate::prayer::GatedField;

pub fn handle_toggle_command(ctx: &CommandContext, field: GatedField) -> Result<()> {
    let mut machine = ctx.machine()?;
    let log = machine.toggle_gated(field, &ctx.now)?;

    match log.mark(field).timestamp() {
        Some(at) => log_info!(
            "{} marked done at {}",
            field,
            at.with_timezone(&ctx.engine.timezone()).format("%H:%M")
        ),
        None => log_info!("{} unmarked", field),
    }
    log_end!();
    Ok(())
}

pub fn handle_travel_command(ctx: &CommandContext) -> Result<()> {
    let mut machine = ctx.machine()?;
    let log = machine.toggle_travel_mode()?;
    if log.travel_mode_active {
        log_info!("Travel mode on: prayer and hygiene windows are lifted for today");
    } else {
        log_info!("Travel mode off");
    }
    log_end!();
    Ok(())
}

fn set(ctx: &CommandContext, entry: UngatedEntry) -> Result<()> {
    let field = entry.field();
    let mut machine = ctx.machine()?;
    machine.set_ungated(entry)?;
    log_info!("{} recorded", field);
    log_end!();
    Ok(())
}

pub fn handle_exercise_command(
    ctx: &CommandContext,
    kind: String,
    minutes: Option<u32>,
) -> Result<()> {
    set(
        ctx,
        UngatedEntry::Exercise(Exercise {
            kind,
            duration_minutes: minutes,
        }),
    )
}

pub fn handle_reading_command(
    ctx: &CommandContext,
    text: String,
    perspective: Option<String>,
) -> Result<()> {
    set(ctx, UngatedEntry::Reading(Reading { text, perspective }))
}

pub fn handle_environment_command(ctx: &CommandContext, note: Option<String>) -> Result<()> {
    set(ctx, UngatedEntry::Environment(EnvironmentCheck { note }))
}

pub fn handle_languages_command(
    ctx: &CommandContext,
    languages: Vec<String>,
    tool: String,
    activities: Vec<String>,
) -> Result<()> {
    set(
        ctx,
        UngatedEntry::Languages(LanguagePractice {
            languages,
            tool,
            activities,
        }),
    )
}

pub fn handle_reflect_command(
    ctx: &CommandContext,
    presence: u8,
    notes: Option<String>,
) -> Result<()> {
    let mut reflection = Reflection::new(ctx.now.with_timezone(&Utc));
    reflection.presence = presence;
    reflection.notes = notes.unwrap_or_default();
    set(ctx, UngatedEntry::Reflection(reflection))
}

pub fn handle_clear_command(ctx: &CommandContext, field: UngatedField) -> Result<()> {
    let mut machine = ctx.machine()?;
    machine.clear_ungated(field)?;
    log_info!("{} cleared", field);
    log_end!();
    Ok(())
}
