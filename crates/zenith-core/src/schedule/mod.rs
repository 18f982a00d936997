//! Recurring weekly schedules.
//!
//! A [`Schedule`] is a same-day window (`start_time < end_time`, never spanning
//! midnight) repeated on a set of weekdays, typed as either a focus window or a
//! full lockout.

mod repository;

pub use repository::ScheduleRepository;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    #[default]
    Focus,
    /// Older stores call this `sleep`.
    #[serde(alias = "sleep")]
    Lockout,
}

impl ScheduleType {
    pub fn label(self) -> &'static str {
        match self {
            ScheduleType::Focus => "Focus session",
            ScheduleType::Lockout => "Lockout",
        }
    }
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "focus" => Ok(ScheduleType::Focus),
            "lockout" | "sleep" => Ok(ScheduleType::Lockout),
            other => Err(format!("unknown schedule type '{other}' (expected focus|lockout)")),
        }
    }
}

/// Minute of day, written as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    pub fn of<T: Timelike>(t: &T) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // hour < 24 and minute < 60 by construction.
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ValidationError::InvalidTimeFormat(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(bad());
        }
        let hour: u8 = s[..2].parse().map_err(|_| bad())?;
        let minute: u8 = s[3..].parse().map_err(|_| bad())?;
        if !s[..2].bytes().chain(s[3..].bytes()).all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        Self::new(hour, minute).ok_or_else(bad)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A recurring weekly window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub title: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// 0 = Sunday .. 6 = Saturday.
    pub days: Vec<u8>,
    /// Missing in stores written before lockouts existed.
    #[serde(rename = "type", default)]
    pub kind: ScheduleType,
}

impl Schedule {
    pub fn runs_on(&self, weekday: Weekday) -> bool {
        let day = weekday.num_days_from_sunday() as u8;
        self.days.contains(&day)
    }

    /// Whether the window covers `weekday` at `time`. The end minute is exclusive.
    pub fn covers(&self, weekday: Weekday, time: TimeOfDay) -> bool {
        self.runs_on(weekday) && self.start_time <= time && time < self.end_time
    }
}

/// Everything about a schedule except its id: the input to create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    pub title: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub days: Vec<u8>,
    #[serde(rename = "type", default)]
    pub kind: ScheduleType,
}

impl ScheduleDraft {
    /// Check the draft against the schedule invariants.
    ///
    /// # Errors
    /// Returns the first violated rule: empty title, no days, a day outside
    /// 0..=6 or listed twice, or an end time not after the start time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.days.is_empty() {
            return Err(ValidationError::NoDaysSelected);
        }
        let mut seen = [false; 7];
        for &day in &self.days {
            let slot = seen
                .get_mut(usize::from(day))
                .ok_or(ValidationError::DayOutOfRange(day))?;
            if *slot {
                return Err(ValidationError::DuplicateDay(day));
            }
            *slot = true;
        }
        if self.start_time >= self.end_time {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start_time.to_string(),
                end: self.end_time.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn into_schedule(self, id: String) -> Schedule {
        Schedule {
            id,
            title: self.title.trim().to_string(),
            start_time: self.start_time,
            end_time: self.end_time,
            days: self.days,
            kind: self.kind,
        }
    }
}

impl From<&Schedule> for ScheduleDraft {
    fn from(s: &Schedule) -> Self {
        Self {
            title: s.title.clone(),
            start_time: s.start_time,
            end_time: s.end_time,
            days: s.days.clone(),
            kind: s.kind,
        }
    }
}
