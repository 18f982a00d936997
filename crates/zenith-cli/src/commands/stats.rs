use chrono::{DateTime, Local};
use zenith_core::{format_minutes, HistoryFilter};

use super::{open_app, CmdResult};

/// Totals and today's numbers.
pub fn run() -> CmdResult {
    let mut app = open_app()?;
    let now = app.now();
    let ledger = app.ledger();
    let today = ledger.history_filtered(HistoryFilter::Today, &now);
    let today_minutes: u64 = today.iter().map(|r| u64::from(r.duration_minutes)).sum();

    println!("Total focus:  {}", format_minutes(ledger.total_focus_minutes()));
    println!("Total usage:  {}", format_minutes(ledger.total_usage_minutes()));
    println!(
        "Today:        {} in {} session(s)",
        format_minutes(today_minutes),
        today.len()
    );
    if let Some(goal) = app.goal() {
        println!(
            "Daily goal:   {}/{} ({:.0}%)",
            goal.progress,
            goal.target,
            goal.percent()
        );
    }
    Ok(())
}

/// Completed sessions, newest first.
pub fn history(filter: HistoryFilter) -> CmdResult {
    let app = open_app()?;
    let now = app.now();
    let records = app.ledger().history_filtered(filter, &now);
    if records.is_empty() {
        println!("no sessions");
        return Ok(());
    }
    for record in records {
        let when = DateTime::from_timestamp_millis(record.completed_at_ms)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".into());
        println!("{when}  {}", format_minutes(u64::from(record.duration_minutes)));
    }
    Ok(())
}
