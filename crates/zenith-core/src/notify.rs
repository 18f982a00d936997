//! Upcoming-start notifications.
//!
//! Runs on its own, coarser tick. A schedule whose start is 1..=lead minutes
//! away on a day it recurs gets exactly one notification per calendar day.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::schedule::{Schedule, TimeOfDay};

pub const NOTIFICATION_TITLE: &str = "Upcoming Schedule";
pub const DEFAULT_LEAD_MINUTES: u32 = 5;

/// Host notification permission. Anything but `Granted` silences the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub schedule_id: String,
    pub title: String,
    pub body: String,
}

/// Host notification capability.
pub trait Notifier {
    fn permission(&self) -> NotificationPermission;
    fn notify(&mut self, notification: &Notification) -> std::io::Result<()>;
}

pub struct NotificationScheduler {
    lead_minutes: u32,
    last_seen: Option<NaiveDate>,
    sent: HashSet<(String, NaiveDate)>,
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_MINUTES)
    }
}

impl NotificationScheduler {
    pub fn new(lead_minutes: u32) -> Self {
        Self {
            lead_minutes,
            last_seen: None,
            sent: HashSet::new(),
        }
    }

    pub fn lead_minutes(&self) -> u32 {
        self.lead_minutes
    }

    pub fn set_lead_minutes(&mut self, lead_minutes: u32) {
        self.lead_minutes = lead_minutes;
    }

    pub fn already_sent(&self, schedule_id: &str, date: NaiveDate) -> bool {
        self.sent.contains(&(schedule_id.to_string(), date))
    }

    /// Evaluate `schedules` at `now` and emit through `notifier`.
    ///
    /// Returns what was emitted. A failed `notify` is logged and still counts as
    /// sent for the day.
    pub fn tick(
        &mut self,
        now: &DateTime<FixedOffset>,
        schedules: &[Schedule],
        notifier: &mut dyn Notifier,
    ) -> Vec<Notification> {
        if notifier.permission() != NotificationPermission::Granted {
            return Vec::new();
        }

        let today = now.date_naive();
        if self.last_seen != Some(today) {
            if !self.sent.is_empty() {
                tracing::debug!(cleared = self.sent.len(), %today, "new day, clearing sent notifications");
            }
            self.sent.clear();
            self.last_seen = Some(today);
        }

        let weekday = now.weekday();
        let current = TimeOfDay::of(now).minutes() as i64;
        let mut emitted = Vec::new();

        for schedule in schedules.iter().filter(|s| s.runs_on(weekday)) {
            let until = schedule.start_time.minutes() as i64 - current;
            if until <= 0 || until > i64::from(self.lead_minutes) {
                continue;
            }
            let key = (schedule.id.clone(), today);
            if self.sent.contains(&key) {
                continue;
            }

            let notification = Notification {
                schedule_id: schedule.id.clone(),
                title: NOTIFICATION_TITLE.to_string(),
                body: format!(
                    "Your \"{}\" {} is starting in {} minute(s).",
                    schedule.title,
                    schedule.kind.label(),
                    until
                ),
            };
            if let Err(e) = notifier.notify(&notification) {
                tracing::warn!(schedule_id = %schedule.id, error = %e, "notification delivery failed");
            } else {
                tracing::info!(schedule_id = %schedule.id, minutes = until, "upcoming schedule notified");
            }
            self.sent.insert(key);
            emitted.push(notification);
        }

        emitted
    }
}

/// Notifier that only records what it was asked to show.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct RecordingNotifier {
    pub permission: NotificationPermission,
    pub delivered: Vec<Notification>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission,
            delivered: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&mut self, notification: &Notification) -> std::io::Result<()> {
        self.delivered.push(notification.clone());
        Ok(())
    }
}
