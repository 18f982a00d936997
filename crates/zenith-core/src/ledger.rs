//! Session ledger: focus totals, capped history, and the daily goal.
//!
//! Fed by focus-phase completions from the timer. Writes from tick handlers
//! log store failures and the in-memory ledger carries on. Goal changes made
//! by the user return the failure instead.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::str::FromStr;

use crate::clock::date_key;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::{keys, load, load_or_default, save, KvStore};

/// Most recent sessions kept in history.
pub const HISTORY_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    /// Epoch milliseconds.
    #[serde(rename = "completedAt")]
    pub completed_at_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalType {
    #[serde(rename = "sessions")]
    SessionCount,
    #[serde(rename = "duration")]
    DurationMinutes,
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sessions" => Ok(GoalType::SessionCount),
            "duration" | "minutes" => Ok(GoalType::DurationMinutes),
            other => Err(format!("unknown goal type '{other}' (expected sessions|duration)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoal {
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target: u32,
    pub progress: u32,
    /// `YYYY-MM-DD` of the day `progress` belongs to.
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

impl DailyGoal {
    /// Zero the progress if it belongs to another day. Returns whether it did.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        let today = date_key(today);
        if self.last_updated == today {
            return false;
        }
        self.progress = 0;
        self.last_updated = today;
        true
    }

    /// Progress toward the target, capped at 100.
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        (f64::from(self.progress) / f64::from(self.target) * 100.0).min(100.0)
    }

    pub fn is_met(&self) -> bool {
        self.progress >= self.target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    Today,
    /// Today and the six days before it.
    Week,
    #[default]
    All,
}

impl FromStr for HistoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Ok(HistoryFilter::Today),
            "week" => Ok(HistoryFilter::Week),
            "all" => Ok(HistoryFilter::All),
            other => Err(format!("unknown filter '{other}' (expected today|week|all)")),
        }
    }
}

/// `42m`, `1h 5m`.
pub fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

pub struct SessionLedger {
    store: Rc<dyn KvStore>,
    total_focus_minutes: u64,
    total_usage_minutes: u64,
    /// Newest first.
    history: Vec<SessionRecord>,
    goal: Option<DailyGoal>,
}

impl SessionLedger {
    /// Load persisted totals, history, and goal. A goal from an earlier day
    /// comes back with zero progress.
    pub fn load(store: Rc<dyn KvStore>, today: NaiveDate) -> Self {
        let mut history: Vec<SessionRecord> = load_or_default(&*store, keys::FOCUS_HISTORY);
        history.truncate(HISTORY_CAP);
        let mut ledger = Self {
            total_focus_minutes: load_or_default(&*store, keys::TOTAL_FOCUS_MINUTES),
            total_usage_minutes: load_or_default(&*store, keys::TOTAL_USAGE_MINUTES),
            history,
            goal: load(&*store, keys::DAILY_GOAL),
            store,
        };
        ledger.roll_over_goal(today);
        ledger
    }

    pub fn total_focus_minutes(&self) -> u64 {
        self.total_focus_minutes
    }

    pub fn total_usage_minutes(&self) -> u64 {
        self.total_usage_minutes
    }

    pub fn goal(&self) -> Option<&DailyGoal> {
        self.goal.as_ref()
    }

    pub fn history(&self) -> &[SessionRecord] {
        &self.history
    }

    /// History entries completed within `filter`, as seen at `now`.
    pub fn history_filtered(
        &self,
        filter: HistoryFilter,
        now: &DateTime<FixedOffset>,
    ) -> Vec<&SessionRecord> {
        let days_back = match filter {
            HistoryFilter::All => return self.history.iter().collect(),
            HistoryFilter::Today => 0,
            HistoryFilter::Week => 6,
        };
        let since = now
            .date_naive()
            .checked_sub_days(Days::new(days_back))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|midnight| now.offset().from_local_datetime(&midnight).single())
            .map_or(i64::MIN, |dt| dt.timestamp_millis());
        self.history
            .iter()
            .filter(|r| r.completed_at_ms >= since)
            .collect()
    }

    /// Count one completed focus session of `duration_minutes`.
    pub fn record_focus(&mut self, duration_minutes: u32, now: DateTime<FixedOffset>) -> Vec<Event> {
        if duration_minutes == 0 {
            return Vec::new();
        }

        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            duration_minutes,
            completed_at_ms: now.timestamp_millis(),
        };
        self.history.insert(0, record.clone());
        self.history.truncate(HISTORY_CAP);
        self.total_focus_minutes += u64::from(duration_minutes);
        self.persist(keys::FOCUS_HISTORY, &self.history);
        self.persist(keys::TOTAL_FOCUS_MINUTES, &self.total_focus_minutes);
        tracing::info!(duration_minutes, total = self.total_focus_minutes, "focus session recorded");

        let mut events = vec![Event::SessionRecorded {
            record,
            total_focus_minutes: self.total_focus_minutes,
            at: now,
        }];

        self.roll_over_goal(now.date_naive());
        if let Some(goal) = self.goal.as_mut() {
            goal.progress += match goal.goal_type {
                GoalType::SessionCount => 1,
                GoalType::DurationMinutes => duration_minutes,
            };
            events.push(Event::GoalProgressed {
                goal_type: goal.goal_type,
                progress: goal.progress,
                target: goal.target,
                at: now,
            });
            self.persist(keys::DAILY_GOAL, &self.goal);
        }
        events
    }

    /// Replace the goal, starting today at zero progress.
    ///
    /// # Errors
    /// Returns `InvalidGoalTarget` unless `target` is positive, or a store
    /// error if the goal cannot be written. Nothing changes on error.
    pub fn set_goal(
        &mut self,
        goal_type: GoalType,
        target: i64,
        today: NaiveDate,
    ) -> Result<&DailyGoal> {
        let target = u32::try_from(target)
            .ok()
            .filter(|t| *t > 0)
            .ok_or(ValidationError::InvalidGoalTarget(target))?;
        let goal = DailyGoal {
            goal_type,
            target,
            progress: 0,
            last_updated: date_key(today),
        };
        save(&*self.store, keys::DAILY_GOAL, &goal)?;
        Ok(&*self.goal.insert(goal))
    }

    /// # Errors
    /// Returns a store error if the goal cannot be removed; the goal is kept.
    pub fn clear_goal(&mut self) -> Result<()> {
        self.store.remove(keys::DAILY_GOAL)?;
        self.goal = None;
        Ok(())
    }

    /// Zero a stale goal's progress. Returns whether anything changed.
    pub fn roll_over_goal(&mut self, today: NaiveDate) -> bool {
        let rolled = self.goal.as_mut().is_some_and(|g| g.roll_over(today));
        if rolled {
            tracing::debug!(%today, "daily goal rolled over");
            self.persist(keys::DAILY_GOAL, &self.goal);
        }
        rolled
    }

    /// Count one minute of app usage.
    pub fn add_usage_minute(&mut self) -> u64 {
        self.total_usage_minutes += 1;
        self.persist(keys::TOTAL_USAGE_MINUTES, &self.total_usage_minutes);
        self.total_usage_minutes
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        // Failures are logged inside `save`; the ledger keeps its in-memory state.
        let _ = save(&*self.store, key, value);
    }
}
