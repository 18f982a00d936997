//! One-time ("quick") lockout lifecycle.
//!
//! Ephemeral: the end timestamp is never persisted. The controller knows nothing
//! about recurring schedules; [`super::resolve`] merges the two.

use chrono::{DateTime, FixedOffset};

use crate::error::ValidationError;

#[derive(Debug, Default, Clone)]
pub struct LockoutController {
    end_ms: Option<i64>,
}

impl LockoutController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a lockout of `duration_minutes` from `now`.
    /// Returns the end timestamp in epoch milliseconds.
    ///
    /// # Errors
    /// Returns `NonPositiveDuration` for zero or negative durations; the current
    /// lockout, if any, is left running.
    pub fn start(
        &mut self,
        now: &DateTime<FixedOffset>,
        duration_minutes: i64,
    ) -> Result<i64, ValidationError> {
        if duration_minutes <= 0 {
            return Err(ValidationError::NonPositiveDuration(duration_minutes));
        }
        let end = now
            .timestamp_millis()
            .saturating_add(duration_minutes.saturating_mul(60_000));
        self.end_ms = Some(end);
        tracing::info!(duration_minutes, end_ms = end, "quick lockout started");
        Ok(end)
    }

    /// Clear the lockout. Returns whether one was set.
    pub fn cancel(&mut self) -> bool {
        let was_set = self.end_ms.take().is_some();
        if was_set {
            tracing::info!("quick lockout cancelled");
        }
        was_set
    }

    /// Self-clear once the end has passed. Returns true on the tick that clears.
    pub fn tick(&mut self, now: &DateTime<FixedOffset>) -> bool {
        match self.end_ms {
            Some(end) if end <= now.timestamp_millis() => {
                self.end_ms = None;
                tracing::info!(end_ms = end, "quick lockout expired");
                true
            }
            _ => false,
        }
    }

    pub fn end_timestamp_ms(&self) -> Option<i64> {
        self.end_ms
    }

    pub fn is_active(&self, now: &DateTime<FixedOffset>) -> bool {
        self.end_ms.is_some_and(|end| end > now.timestamp_millis())
    }
}
