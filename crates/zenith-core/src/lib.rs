//! # Zenith Core Library
//!
//! Core logic for Zenith, a focus and lockout scheduler. Everything here is
//! host-agnostic: the `zenith` CLI is a thin shell over the same API, and
//! notifications, audio, and persistence are reached through traits.
//!
//! ## Architecture
//!
//! - **Schedules**: recurring weekly focus and lockout windows, persisted as JSON
//! - **Activation**: a pure resolver over (time, schedules, quick lockout) plus
//!   the quick-lockout lifecycle
//! - **Notifications**: one heads-up per schedule per day, ahead of its start
//! - **Timer**: countdown state machine with standard and Pomodoro modes
//! - **Ledger**: focus totals, history, and the daily goal
//! - **Runtime**: the app object and the tokio tick driver
//!
//! ## Key Components
//!
//! - [`Zenith`]: wires every component to one store and one clock
//! - [`resolve`]: active-window resolution
//! - [`FocusTimer`]: session timer
//! - [`Database`]: SQLite key-value store
//! - [`Config`]: application configuration

pub mod activation;
pub mod clock;
pub mod error;
pub mod events;
pub mod ledger;
pub mod notify;
pub mod runtime;
pub mod schedule;
pub mod storage;
pub mod timer;
pub mod todo;

pub use activation::{resolve, ActivationResult, LockoutController, QUICK_LOCKOUT_TITLE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CommandError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use ledger::{format_minutes, DailyGoal, GoalType, HistoryFilter, SessionLedger, SessionRecord};
pub use notify::{Notification, NotificationPermission, NotificationScheduler, Notifier};
pub use runtime::{Command, Driver, RunSummary, TickHandle, TickKind, TickPeriods, Zenith};
pub use schedule::{Schedule, ScheduleDraft, ScheduleRepository, ScheduleType, TimeOfDay};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{
    FocusSound, FocusTimer, Phase, TimerEngine, TimerMode, TimerSnapshot, TimerState, FOCUS_SOUNDS,
};
pub use todo::{Todo, TodoList};
