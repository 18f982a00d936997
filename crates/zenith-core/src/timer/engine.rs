//! Countdown engine.
//!
//! A tick-counted state machine. It does not read the clock or use internal
//! threads - the caller invokes `tick()` once per second while it wants the
//! countdown to advance.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!        Finished -> (start) Running
//! ```
//!
//! `start` and `reset` are accepted from every state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not started, full duration loaded.
    Idle,
    Running,
    Paused,
    /// Reached zero. Only `start` or `reset` leave this state.
    Finished,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    state: TimerState,
    /// Seconds left in the current countdown.
    total_seconds: u64,
    /// Seconds the current countdown was loaded with.
    loaded_seconds: u64,
}

impl TimerEngine {
    /// Create an idle engine loaded with `duration_minutes`.
    pub fn new(duration_minutes: u32) -> Self {
        let loaded = minutes_to_secs(duration_minutes);
        Self {
            state: TimerState::Idle,
            total_seconds: loaded,
            loaded_seconds: loaded,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn loaded_seconds(&self) -> u64 {
        self.loaded_seconds
    }

    pub fn loaded_minutes(&self) -> u32 {
        (self.loaded_seconds / 60) as u32
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    /// Some time has elapsed on the loaded countdown.
    pub fn has_started(&self) -> bool {
        self.total_seconds < self.loaded_seconds
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load `duration_minutes` and run, from any state.
    pub fn start(&mut self, duration_minutes: u32) {
        self.load(duration_minutes);
        self.state = TimerState::Running;
    }

    /// `Running -> Paused`. Returns false (and does nothing) elsewhere.
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    /// `Paused -> Running`. A finished countdown cannot be resumed.
    pub fn resume(&mut self) -> bool {
        if self.state != TimerState::Paused {
            return false;
        }
        self.state = TimerState::Running;
        true
    }

    /// Back to `Idle` with `duration_minutes` loaded, from any state.
    pub fn reset(&mut self, duration_minutes: u32) {
        self.load(duration_minutes);
        self.state = TimerState::Idle;
    }

    /// Reload the duration only while idle. A running or paused countdown, or
    /// a finished one awaiting acknowledgement, keeps what it has.
    pub fn reload_if_idle(&mut self, duration_minutes: u32) -> bool {
        if self.state != TimerState::Idle {
            return false;
        }
        self.load(duration_minutes);
        true
    }

    /// Advance one second. Returns true on the tick that reaches zero; that
    /// tick moves to `Finished` and nothing fires again until a new `start`.
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.total_seconds = self.total_seconds.saturating_sub(1);
        if self.total_seconds == 0 {
            self.state = TimerState::Finished;
            return true;
        }
        false
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load(&mut self, duration_minutes: u32) {
        self.loaded_seconds = minutes_to_secs(duration_minutes);
        self.total_seconds = self.loaded_seconds;
    }
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}
