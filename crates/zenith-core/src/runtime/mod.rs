//! The application object: every component wired to one store and one clock.
//!
//! Tick handlers (`tick_second`, `tick_notifications`, `tick_usage`) never touch
//! the schedule list; only the explicit CRUD calls write it.

mod command;
mod driver;

pub use command::Command;
pub use driver::{Driver, RunSummary, TickHandle, TickKind, TickPeriods};

use chrono::{DateTime, FixedOffset};
use std::rc::Rc;

use crate::activation::{resolve, ActivationResult, LockoutController};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::ledger::{DailyGoal, GoalType, SessionLedger};
use crate::notify::{NotificationScheduler, Notifier};
use crate::schedule::{Schedule, ScheduleDraft, ScheduleRepository};
use crate::storage::{keys, load, load_or_default, save, Config, KvStore};
use crate::timer::{
    clamp_focus_minutes, AudioSink, FocusSound, FocusTimer, TimerMode, TimerSnapshot,
    DEFAULT_FOCUS_MINUTES,
};
use crate::todo::TodoList;

pub struct Zenith<C: Clock> {
    clock: C,
    store: Rc<dyn KvStore>,
    config: Config,
    schedules: ScheduleRepository,
    lockout: LockoutController,
    notifications: NotificationScheduler,
    timer: FocusTimer,
    ledger: SessionLedger,
    todos: TodoList,
    activation: ActivationResult,
}

impl<C: Clock> Zenith<C> {
    /// Load all persisted state from `store`. Zero minute fields in `config`
    /// fall back to their defaults.
    pub fn new(
        store: Rc<dyn KvStore>,
        clock: C,
        mut config: Config,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        config.sanitize();
        let focus_duration = load::<i64>(&*store, keys::FOCUS_DURATION)
            .map_or(DEFAULT_FOCUS_MINUTES, clamp_focus_minutes);
        let mode: TimerMode = load_or_default(&*store, keys::TIMER_MODE);
        let sound_id = load::<String>(&*store, keys::FOCUS_SOUND_ID);
        let timer = FocusTimer::new(
            mode,
            focus_duration,
            FocusSound::by_id_or_default(sound_id.as_deref()),
            config.pomodoro.clone(),
            audio,
        );

        Self {
            schedules: ScheduleRepository::load(store.clone()),
            lockout: LockoutController::new(),
            notifications: NotificationScheduler::new(config.notifications.lead_minutes),
            timer,
            ledger: SessionLedger::load(store.clone(), clock.today()),
            todos: TodoList::load(store.clone()),
            activation: ActivationResult::default(),
            config,
            clock,
            store,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schedules(&self) -> &[Schedule] {
        self.schedules.schedules()
    }

    /// Activation as of the last `tick_second`.
    pub fn activation(&self) -> &ActivationResult {
        &self.activation
    }

    /// Activation recomputed for the current instant, without publishing it.
    pub fn status(&self) -> ActivationResult {
        resolve(
            &self.clock.now(),
            self.schedules.schedules(),
            self.lockout.end_timestamp_ms(),
        )
    }

    pub fn lockout_end_ms(&self) -> Option<i64> {
        self.lockout.end_timestamp_ms()
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn todos(&self) -> &TodoList {
        &self.todos
    }

    pub fn todos_mut(&mut self) -> &mut TodoList {
        &mut self.todos
    }

    // ── Schedules ────────────────────────────────────────────────────

    pub fn create_schedule(&mut self, draft: ScheduleDraft) -> Result<Schedule> {
        self.schedules.create(draft).cloned()
    }

    pub fn update_schedule(&mut self, id: &str, draft: ScheduleDraft) -> Result<Schedule> {
        self.schedules.update(id, draft).cloned()
    }

    pub fn delete_schedule(&mut self, id: &str) -> Result<Schedule> {
        self.schedules.delete(id)
    }

    // ── Quick lockout ────────────────────────────────────────────────

    /// Start a one-time lockout and publish the resulting activation.
    ///
    /// # Errors
    /// Returns `NonPositiveDuration` unless `minutes > 0`.
    pub fn start_quick_lockout(&mut self, minutes: i64) -> Result<Vec<Event>> {
        let now = self.clock.now();
        let ends_at_ms = self.lockout.start(&now, minutes)?;
        let mut events = vec![Event::LockoutStarted { ends_at_ms, at: now }];
        events.extend(self.publish_activation(now));
        Ok(events)
    }

    pub fn cancel_quick_lockout(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();
        if self.lockout.cancel() {
            events.push(Event::LockoutCancelled { at: now });
        }
        events.extend(self.publish_activation(now));
        events
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start_timer(&mut self) -> Event {
        self.timer.start(self.clock.now())
    }

    pub fn pause_timer(&mut self) -> Option<Event> {
        self.timer.pause(self.clock.now())
    }

    pub fn resume_timer(&mut self) -> Option<Event> {
        self.timer.resume(self.clock.now())
    }

    /// Reset the timer. Ends the session, so the to-do list is cleared too.
    pub fn reset_timer(&mut self) -> Event {
        self.todos.clear();
        self.timer.reset(self.clock.now())
    }

    /// Persist and apply the focus length. Returns the clamped value.
    ///
    /// # Errors
    /// Returns a store error if the length cannot be written; the timer keeps
    /// its previous length.
    pub fn set_focus_duration(&mut self, minutes: i64) -> Result<u32> {
        let clamped = clamp_focus_minutes(minutes);
        save(&*self.store, keys::FOCUS_DURATION, &clamped)?;
        Ok(self.timer.set_focus_duration(i64::from(clamped)))
    }

    /// Step the focus length by `delta` minutes.
    ///
    /// # Errors
    /// Same as [`Self::set_focus_duration`].
    pub fn adjust_focus_duration(&mut self, delta: i64) -> Result<u32> {
        self.set_focus_duration(i64::from(self.timer.focus_duration()) + delta)
    }

    /// Persist and apply the timer mode. A change resets the timer and clears
    /// the to-do list.
    ///
    /// # Errors
    /// Returns a store error if the mode cannot be written; nothing changes.
    pub fn set_timer_mode(&mut self, mode: TimerMode) -> Result<Option<Event>> {
        save(&*self.store, keys::TIMER_MODE, &mode)?;
        let event = self.timer.set_mode(mode, self.clock.now());
        if event.is_some() {
            self.todos.clear();
        }
        Ok(event)
    }

    /// Switch the ambient sound by catalog id.
    ///
    /// # Errors
    /// Returns `NotFound` for an id outside the catalog, or a store error if
    /// the choice cannot be written.
    pub fn select_sound(&mut self, id: &str) -> Result<&'static FocusSound> {
        let sound = FocusSound::by_id(id).ok_or_else(|| CoreError::NotFound {
            kind: "sound",
            id: id.to_string(),
        })?;
        save(&*self.store, keys::FOCUS_SOUND_ID, sound.id)?;
        self.timer.select_sound(sound);
        Ok(sound)
    }

    // ── Ledger ───────────────────────────────────────────────────────

    pub fn set_goal(&mut self, goal_type: GoalType, target: i64) -> Result<DailyGoal> {
        let today = self.clock.today();
        Ok(self.ledger.set_goal(goal_type, target, today)?.clone())
    }

    /// Today's goal, rolled over first if it belongs to an earlier day.
    pub fn goal(&mut self) -> Option<&DailyGoal> {
        self.ledger.roll_over_goal(self.clock.today());
        self.ledger.goal()
    }

    pub fn clear_goal(&mut self) -> Result<()> {
        self.ledger.clear_goal()
    }

    // ── Config ───────────────────────────────────────────────────────

    /// Apply a new configuration to the running components. Zero minute
    /// fields fall back to their defaults.
    pub fn apply_config(&mut self, mut config: Config) {
        config.sanitize();
        self.timer.set_pomodoro(config.pomodoro.clone());
        self.notifications
            .set_lead_minutes(config.notifications.lead_minutes);
        self.config = config;
    }

    // ── Ticks ────────────────────────────────────────────────────────

    /// One-second tick.
    ///
    /// Lockout expiry is resolved before the activation is recomputed, so the
    /// published activation never shows an expired quick lockout. A focus
    /// completion is written to the ledger on the same tick.
    pub fn tick_second(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();

        if self.lockout.tick(&now) {
            events.push(Event::LockoutExpired { at: now });
        }
        events.extend(self.publish_activation(now));

        for event in self.timer.tick(now) {
            let focus_minutes = event.completed_focus_minutes();
            events.push(event);
            if let Some(minutes) = focus_minutes {
                events.extend(self.ledger.record_focus(minutes, now));
            }
        }
        events
    }

    /// Upcoming-start notifications.
    pub fn tick_notifications(&mut self, notifier: &mut dyn Notifier) -> Vec<Event> {
        let now = self.clock.now();
        self.notifications
            .tick(&now, self.schedules.schedules(), notifier)
            .into_iter()
            .map(|n| Event::NotificationSent {
                schedule_id: n.schedule_id,
                title: n.title,
                body: n.body,
                at: now,
            })
            .collect()
    }

    /// One minute of app usage. Returns the new total.
    pub fn tick_usage(&mut self) -> u64 {
        self.ledger.roll_over_goal(self.clock.today());
        self.ledger.add_usage_minute()
    }

    fn publish_activation(&mut self, now: DateTime<FixedOffset>) -> Option<Event> {
        let next = resolve(&now, self.schedules.schedules(), self.lockout.end_timestamp_ms());
        let changed = next.differs_in_kind(&self.activation);
        self.activation = next;
        if !changed {
            return None;
        }
        tracing::debug!(
            focus = ?self.activation.active_focus.as_ref().map(|s| &s.title),
            lockout = ?self.activation.active_lockout_title,
            "activation changed"
        );
        Some(Event::ActivationChanged {
            focus_schedule_id: self.activation.active_focus.as_ref().map(|s| s.id.clone()),
            focus_title: self.activation.active_focus.as_ref().map(|s| s.title.clone()),
            lockout_title: self.activation.active_lockout_title.clone(),
            at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::QUICK_LOCKOUT_TITLE;
    use crate::clock::ManualClock;
    use crate::schedule::{ScheduleType, TimeOfDay};
    use crate::storage::MemoryStore;
    use crate::timer::{NullAudio, Phase, TimerState};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn app(start: &str) -> (Rc<MemoryStore>, Rc<ManualClock>, Zenith<Rc<ManualClock>>) {
        let store = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock::new(at(start)));
        let app = Zenith::new(
            store.clone(),
            clock.clone(),
            Config::default(),
            Box::new(NullAudio),
        );
        (store, clock, app)
    }

    fn draft(title: &str, start: (u8, u8), end: (u8, u8), kind: ScheduleType) -> ScheduleDraft {
        ScheduleDraft {
            title: title.into(),
            start_time: TimeOfDay::new(start.0, start.1).unwrap(),
            end_time: TimeOfDay::new(end.0, end.1).unwrap(),
            days: vec![1, 2, 3, 4, 5],
            kind,
        }
    }

    #[test]
    fn quick_lockout_expiry_is_visible_on_the_same_tick() {
        // Wednesday
        let (_, clock, mut app) = app("2024-01-10T10:00:00+00:00");
        let events = app.start_quick_lockout(1).unwrap();
        assert!(matches!(events[0], Event::LockoutStarted { .. }));
        assert_eq!(
            app.activation().active_lockout_title.as_deref(),
            Some(QUICK_LOCKOUT_TITLE)
        );

        clock.advance_secs(60);
        let events = app.tick_second();
        assert!(matches!(events[0], Event::LockoutExpired { .. }));
        assert!(matches!(
            events[1],
            Event::ActivationChanged { lockout_title: None, .. }
        ));
        assert!(!app.activation().is_locked_out());
    }

    #[test]
    fn rejects_non_positive_lockout() {
        let (_, _, mut app) = app("2024-01-10T10:00:00+00:00");
        assert!(app.start_quick_lockout(0).is_err());
        assert!(app.lockout_end_ms().is_none());
    }

    #[test]
    fn activation_changes_are_published_once() {
        let (_, clock, mut app) = app("2024-01-10T08:59:59+00:00");
        app.create_schedule(draft("Deep Work", (9, 0), (17, 0), ScheduleType::Focus))
            .unwrap();

        assert!(app.tick_second().is_empty());
        clock.advance_secs(1);
        let events = app.tick_second();
        assert!(matches!(
            events.as_slice(),
            [Event::ActivationChanged { focus_title: Some(t), .. }] if t == "Deep Work"
        ));
        assert_eq!(app.activation().focus_remaining_seconds, 8 * 3600);

        clock.advance_secs(1);
        assert!(app.tick_second().is_empty());
        assert_eq!(app.activation().focus_remaining_seconds, 8 * 3600 - 1);
    }

    #[test]
    fn standard_completion_lands_in_ledger() {
        let (store, clock, mut app) = app("2024-01-10T09:00:00+00:00");
        app.set_focus_duration(5).unwrap();
        app.start_timer();

        let mut events = Vec::new();
        for _ in 0..300 {
            clock.advance_secs(1);
            events.extend(app.tick_second());
        }
        assert_eq!(app.timer().state(), TimerState::Finished);
        assert!(matches!(
            events.as_slice(),
            [
                Event::TimerCompleted { phase: Phase::Focus, duration_minutes: 5, .. },
                Event::SessionRecorded { total_focus_minutes: 5, .. },
            ]
        ));

        let minutes: u64 = load_or_default(&*store, keys::TOTAL_FOCUS_MINUTES);
        assert_eq!(minutes, 5);
    }

    #[test]
    fn timer_settings_persist_across_restart() {
        let (store, clock, mut app) = app("2024-01-10T09:00:00+00:00");
        assert_eq!(app.set_focus_duration(42).unwrap(), 40);
        app.set_timer_mode(TimerMode::Pomodoro).unwrap();
        app.select_sound("ocean").unwrap();
        assert!(app.select_sound("whale-song").is_err());

        let reloaded = Zenith::new(store, clock, Config::default(), Box::new(NullAudio));
        let snap = reloaded.timer_snapshot();
        assert_eq!(snap.focus_duration_minutes, 40);
        assert_eq!(snap.mode, TimerMode::Pomodoro);
        assert_eq!(snap.sound_id, "ocean");
    }

    #[test]
    fn rejected_writes_surface_and_leave_state_alone() {
        use crate::storage::FailingStore;

        let clock = ManualClock::new(at("2024-01-10T09:00:00+00:00"));
        let mut app = Zenith::new(
            Rc::new(FailingStore),
            clock,
            Config::default(),
            Box::new(NullAudio),
        );

        assert!(matches!(
            app.set_goal(GoalType::SessionCount, 4),
            Err(CoreError::Store(_))
        ));
        assert!(app.goal().is_none());
        assert!(matches!(app.select_sound("ocean"), Err(CoreError::Store(_))));
        assert!(matches!(
            app.set_focus_duration(40),
            Err(CoreError::Store(_))
        ));
        assert!(matches!(
            app.adjust_focus_duration(5),
            Err(CoreError::Store(_))
        ));
        assert!(matches!(
            app.set_timer_mode(TimerMode::Pomodoro),
            Err(CoreError::Store(_))
        ));

        let snap = app.timer_snapshot();
        assert_eq!(snap.focus_duration_minutes, DEFAULT_FOCUS_MINUTES);
        assert_eq!(snap.mode, TimerMode::Standard);
        assert_ne!(snap.sound_id, "ocean");
    }

    #[test]
    fn zero_pomodoro_minutes_do_not_complete_on_first_tick() {
        let store = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock::new(at("2024-01-10T09:00:00+00:00")));
        let mut config = Config::default();
        config.pomodoro.focus_minutes = 0;
        config.pomodoro.break_minutes = 0;
        let mut app = Zenith::new(store, clock.clone(), config, Box::new(NullAudio));
        app.set_timer_mode(TimerMode::Pomodoro).unwrap();
        app.start_timer();

        clock.advance_secs(1);
        assert!(app.tick_second().is_empty());
        let snap = app.timer_snapshot();
        assert_eq!(snap.cycle_count, 0);
        assert_eq!(snap.phase, Phase::Focus);
        assert_eq!(snap.remaining_seconds, 25 * 60 - 1);

        let mut zeroed = Config::default();
        zeroed.notifications.lead_minutes = 0;
        app.apply_config(zeroed);
        assert_eq!(app.config().notifications.lead_minutes, 5);
    }

    #[test]
    fn reset_clears_todos() {
        let (_, _, mut app) = app("2024-01-10T09:00:00+00:00");
        app.todos_mut().add("draft intro").unwrap();
        app.start_timer();
        app.reset_timer();
        assert!(app.todos().items().is_empty());
    }

    #[test]
    fn notifications_become_events() {
        use crate::notify::{NotificationPermission, RecordingNotifier};

        let (_, clock, mut app) = app("2024-01-10T08:56:00+00:00");
        app.create_schedule(draft("Standup", (9, 0), (9, 15), ScheduleType::Focus))
            .unwrap();
        let mut notifier = RecordingNotifier::new(NotificationPermission::Granted);

        let events = app.tick_notifications(&mut notifier);
        assert!(matches!(
            events.as_slice(),
            [Event::NotificationSent { body, .. }]
                if body == "Your \"Standup\" Focus session is starting in 4 minute(s)."
        ));
        clock.advance_secs(30);
        assert!(app.tick_notifications(&mut notifier).is_empty());
        assert_eq!(notifier.delivered.len(), 1);
    }

    #[test]
    fn goal_view_rolls_over_at_midnight() {
        let (_, clock, mut app) = app("2024-01-10T23:00:00+00:00");
        app.set_goal(GoalType::SessionCount, 2).unwrap();
        app.set_focus_duration(5).unwrap();
        app.start_timer();
        for _ in 0..300 {
            app.tick_second();
        }
        assert_eq!(app.goal().unwrap().progress, 1);

        clock.advance_secs(3600);
        assert_eq!(app.goal().unwrap().progress, 0);
        assert_eq!(app.tick_usage(), 1);
    }
}
