//! `status`: today's record at a glance.

use anyhow::Result;
use chrono_tz::Tz;

use super::CommandContext;
use crate::daily::{DailyLog, DaySummary, Mark, UngatedField, pending_absolutes};
use crate::prayer::GatedField;

pub fn handle_status_command(ctx: &CommandContext) -> Result<()> {
    let machine = ctx.machine()?;
    let log = machine.log();

    log_block_start!(
        "{} for {}{}",
        log.date.format("%A %Y-%m-%d"),
        log.user_id,
        if log.travel_mode_active {
            " (travel mode)"
        } else {
            ""
        }
    );

    log_block_start!("Absolutes:");
    for field in GatedField::ALL {
        let mark = log.mark(field);
        // A failed computation only affects the window column
        let window = ctx
            .engine
            .window_status(field, &ctx.now)
            .map(|(_, status)| status.to_string())
            .unwrap_or_else(|e| e.to_string());
        log_indented!(
            "{} {:<16} {:<6} {}",
            check(mark.is_done()),
            field.to_string(),
            done_time(mark, ctx.engine.timezone()),
            window
        );
    }

    log_block_start!("Daily:");
    for field in UngatedField::ALL {
        log_indented!(
            "{} {:<16} {}",
            check(log.is_ungated_set(field)),
            field.to_string(),
            ungated_detail(log, field)
        );
    }

    let summary = DaySummary::from_log(log);
    log_block_start!(
        "Prayers {} | Hygiene {}",
        summary.prayer_ratio(),
        summary.hygiene
    );
    let pending: Vec<String> = pending_absolutes(log)
        .iter()
        .map(ToString::to_string)
        .collect();
    if pending.is_empty() {
        log_info!("All absolutes done");
    } else {
        log_indented!("Pending: {}", pending.join(", "));
    }
    log_end!();
    Ok(())
}

fn check(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

fn done_time(mark: Mark, tz: Tz) -> String {
    mark.timestamp()
        .map(|t| t.with_timezone(&tz).format("%H:%M").to_string())
        .unwrap_or_default()
}

fn ungated_detail(log: &DailyLog, field: UngatedField) -> String {
    match field {
        UngatedField::Environment => log
            .environment
            .as_ref()
            .and_then(|e| e.note.clone())
            .unwrap_or_default(),
        UngatedField::Exercise => log
            .exercise
            .as_ref()
            .map(|e| match e.duration_minutes {
                Some(minutes) => format!("{} ({minutes} min)", e.kind),
                None => e.kind.clone(),
            })
            .unwrap_or_default(),
        UngatedField::Reading => log
            .reading
            .as_ref()
            .map(|r| match &r.perspective {
                Some(perspective) => format!("{} ({perspective})", r.text),
                None => r.text.clone(),
            })
            .unwrap_or_default(),
        UngatedField::Languages => log
            .languages
            .as_ref()
            .map(|l| format!("{} via {}", l.languages.join(", "), l.tool))
            .unwrap_or_default(),
        UngatedField::Reflection => log
            .reflection
            .as_ref()
            .map(|r| format!("presence {}/10", r.presence))
            .unwrap_or_default(),
    }
}
