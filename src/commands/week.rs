//! `week`: totals for the current Sunday-to-Saturday week.

use anyhow::Result;

use super::CommandContext;
use crate::daily::WeekSummary;

pub fn handle_week_command(ctx: &CommandContext) -> Result<()> {
    let week = WeekSummary::for_week(ctx.store.as_ref(), &ctx.user_id, ctx.now.date_naive())?;

    log_block_start!(
        "Week of {} to {} ({} day(s) logged)",
        week.start,
        week.end,
        week.days_logged
    );
    if week.days_logged == 0 {
        log_indented!("Nothing recorded yet this week");
        log_end!();
        return Ok(());
    }
    log_indented!("Prayers      {}", week.prayers);
    log_indented!("Hygiene      {}", week.hygiene);
    log_indented!("Reading      {}", week.reading);
    log_indented!("Exercise     {}", week.exercise);
    log_indented!("Languages    {}", week.languages);
    log_indented!("Environment  {}", week.environment);
    log_end!();
    Ok(())
}
