//! Active-window resolution.
//!
//! Pure function of the current time, the schedule list, and the one-time
//! lockout end. The same inputs always produce the same [`ActivationResult`].

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use serde::Serialize;

use crate::schedule::{Schedule, ScheduleType, TimeOfDay};

/// Display title used while a one-time lockout is running.
pub const QUICK_LOCKOUT_TITLE: &str = "Quick Lockout";

/// What is active right now. Recomputed on every tick, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    pub active_focus: Option<Schedule>,
    pub focus_remaining_seconds: u64,
    pub active_lockout_title: Option<String>,
    pub lockout_remaining_seconds: u64,
}

impl ActivationResult {
    pub fn is_locked_out(&self) -> bool {
        self.active_lockout_title.is_some()
    }

    /// True when `other` shows a different focus schedule or lockout, ignoring
    /// the countdowns.
    pub fn differs_in_kind(&self, other: &ActivationResult) -> bool {
        self.active_focus.as_ref().map(|s| &s.id) != other.active_focus.as_ref().map(|s| &s.id)
            || self.active_lockout_title != other.active_lockout_title
    }
}

/// Resolve which schedules are active at `now`.
///
/// Among active schedules of one type the first in `schedules` order wins. A
/// one-time lockout ending after `now` always takes the lockout slot, with the
/// fixed [`QUICK_LOCKOUT_TITLE`]; recurring lockouts surface only without one.
/// Focus resolution is independent of either lockout.
pub fn resolve(
    now: &DateTime<FixedOffset>,
    schedules: &[Schedule],
    one_time_lockout_end_ms: Option<i64>,
) -> ActivationResult {
    let weekday = now.weekday();
    let time = TimeOfDay::of(now);

    let first_active = |kind: ScheduleType| {
        schedules
            .iter()
            .find(|s| s.kind == kind && s.covers(weekday, time))
    };

    let mut result = ActivationResult::default();

    if let Some(focus) = first_active(ScheduleType::Focus) {
        result.focus_remaining_seconds = seconds_until_end(now, focus);
        result.active_focus = Some(focus.clone());
    }

    let now_ms = now.timestamp_millis();
    match one_time_lockout_end_ms {
        Some(end_ms) if end_ms > now_ms => {
            result.active_lockout_title = Some(QUICK_LOCKOUT_TITLE.to_string());
            result.lockout_remaining_seconds = round_ms_to_secs(end_ms - now_ms);
        }
        _ => {
            if let Some(lockout) = first_active(ScheduleType::Lockout) {
                result.lockout_remaining_seconds = seconds_until_end(now, lockout);
                result.active_lockout_title = Some(lockout.title.clone());
            }
        }
    }

    result
}

/// Seconds from `now` to today's end of `schedule`, floored at zero.
fn seconds_until_end(now: &DateTime<FixedOffset>, schedule: &Schedule) -> u64 {
    let end_local = now.date_naive().and_time(schedule.end_time.to_naive_time());
    match now.offset().from_local_datetime(&end_local).single() {
        Some(end) => round_ms_to_secs(end.timestamp_millis() - now.timestamp_millis()),
        None => 0,
    }
}

fn round_ms_to_secs(ms: i64) -> u64 {
    if ms <= 0 {
        0
    } else {
        ((ms + 500) / 1000) as u64
    }
}
