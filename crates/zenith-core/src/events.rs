use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::ledger::{GoalType, SessionRecord};
use crate::timer::{Phase, TimerMode};

/// Every observable state change produces an Event.
/// Hosts render from them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The focus schedule or the displayed lockout changed.
    ActivationChanged {
        focus_schedule_id: Option<String>,
        focus_title: Option<String>,
        lockout_title: Option<String>,
        at: DateTime<FixedOffset>,
    },
    LockoutStarted {
        ends_at_ms: i64,
        at: DateTime<FixedOffset>,
    },
    LockoutCancelled {
        at: DateTime<FixedOffset>,
    },
    /// One-time lockout ran out on its own.
    LockoutExpired {
        at: DateTime<FixedOffset>,
    },
    NotificationSent {
        schedule_id: String,
        title: String,
        body: String,
        at: DateTime<FixedOffset>,
    },
    TimerStarted {
        mode: TimerMode,
        phase: Phase,
        duration_secs: u64,
        at: DateTime<FixedOffset>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<FixedOffset>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<FixedOffset>,
    },
    TimerReset {
        at: DateTime<FixedOffset>,
    },
    /// A countdown reached zero. Fired once per countdown.
    TimerCompleted {
        mode: TimerMode,
        phase: Phase,
        duration_minutes: u32,
        at: DateTime<FixedOffset>,
    },
    /// Pomodoro only: the next phase is about to run.
    PhaseChanged {
        phase: Phase,
        cycle_count: u32,
        at: DateTime<FixedOffset>,
    },
    SessionRecorded {
        record: SessionRecord,
        total_focus_minutes: u64,
        at: DateTime<FixedOffset>,
    },
    GoalProgressed {
        goal_type: GoalType,
        progress: u32,
        target: u32,
        at: DateTime<FixedOffset>,
    },
}

impl Event {
    /// Focus-phase completions are the ones the ledger counts.
    pub fn completed_focus_minutes(&self) -> Option<u32> {
        match self {
            Event::TimerCompleted {
                phase: Phase::Focus,
                duration_minutes,
                ..
            } => Some(*duration_minutes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-10T09:00:00+02:00").unwrap()
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::LockoutStarted {
            ends_at_ms: 1_704_870_000_000,
            at: at(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "LockoutStarted");
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn only_focus_completions_count() {
        let focus = Event::TimerCompleted {
            mode: TimerMode::Pomodoro,
            phase: Phase::Focus,
            duration_minutes: 25,
            at: at(),
        };
        let rest = Event::TimerCompleted {
            mode: TimerMode::Pomodoro,
            phase: Phase::Break,
            duration_minutes: 5,
            at: at(),
        };
        assert_eq!(focus.completed_focus_minutes(), Some(25));
        assert_eq!(rest.completed_focus_minutes(), None);
    }
}
