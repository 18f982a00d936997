//! Integration tests for the runtime over the SQLite store.

use chrono::{DateTime, FixedOffset};
use std::rc::Rc;
use zenith_core::storage::{keys, load_or_default, save};
use zenith_core::timer::NullAudio;
use zenith_core::{
    Config, Database, Event, GoalType, KvStore, ManualClock, Notification,
    NotificationPermission, Notifier, Phase, ScheduleDraft, ScheduleRepository, ScheduleType, SessionRecord, TimeOfDay, TimerMode,
    TimerState, Zenith, QUICK_LOCKOUT_TITLE,
};

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn weekdays(title: &str, start: &str, end: &str, kind: ScheduleType) -> ScheduleDraft {
    ScheduleDraft {
        title: title.into(),
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        days: vec![1, 2, 3, 4, 5],
        kind,
    }
}

/// Notifier that keeps whatever it is asked to show.
struct Inbox {
    permission: NotificationPermission,
    delivered: Vec<Notification>,
}

impl Inbox {
    fn new(permission: NotificationPermission) -> Self {
        Self {
            permission,
            delivered: Vec::new(),
        }
    }
}

impl Notifier for Inbox {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&mut self, notification: &Notification) -> std::io::Result<()> {
        self.delivered.push(notification.clone());
        Ok(())
    }
}

fn boot(store: Rc<dyn KvStore>, clock: Rc<ManualClock>) -> Zenith<Rc<ManualClock>> {
    Zenith::new(store, clock, Config::default(), Box::new(NullAudio))
}

#[test]
fn test_wednesday_office_hours() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(at("2024-01-10T09:00:00+00:00")));
    let mut app = boot(store, clock.clone());
    app.create_schedule(weekdays("Office", "09:00", "17:00", ScheduleType::Focus))
        .unwrap();

    app.tick_second();
    let active = app.activation();
    assert_eq!(active.active_focus.as_ref().unwrap().title, "Office");
    assert_eq!(active.focus_remaining_seconds, 8 * 3600);

    clock.set(at("2024-01-10T17:00:00+00:00"));
    app.tick_second();
    assert!(app.activation().active_focus.is_none());
    assert_eq!(app.activation().focus_remaining_seconds, 0);
}

#[test]
fn test_quick_lockout_hides_recurring_lockout() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(at("2024-01-10T22:30:00+00:00")));
    let mut app = boot(store, clock.clone());
    app.create_schedule(weekdays("Wind down", "22:00", "23:30", ScheduleType::Lockout))
        .unwrap();
    app.create_schedule(weekdays("Late reading", "22:00", "23:00", ScheduleType::Focus))
        .unwrap();

    app.tick_second();
    assert_eq!(
        app.activation().active_lockout_title.as_deref(),
        Some("Wind down")
    );

    app.start_quick_lockout(15).unwrap();
    assert_eq!(
        app.activation().active_lockout_title.as_deref(),
        Some(QUICK_LOCKOUT_TITLE)
    );
    assert_eq!(app.activation().lockout_remaining_seconds, 15 * 60);
    // Focus keeps running alongside any lockout.
    assert_eq!(
        app.activation().active_focus.as_ref().unwrap().title,
        "Late reading"
    );

    clock.advance_secs(15 * 60);
    app.tick_second();
    assert_eq!(
        app.activation().active_lockout_title.as_deref(),
        Some("Wind down")
    );
}

#[test]
fn test_notification_once_per_day_across_midnight() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(at("2024-01-10T06:55:00+00:00")));
    let mut app = boot(store, clock.clone());
    app.create_schedule(weekdays("Morning pages", "07:00", "07:30", ScheduleType::Focus))
        .unwrap();
    let mut notifier = Inbox::new(NotificationPermission::Granted);

    // 06:55:00 is exactly 5 minutes out; run the 30 s tick through 07:00.
    for _ in 0..=10 {
        app.tick_notifications(&mut notifier);
        clock.advance_secs(30);
    }
    assert_eq!(notifier.delivered.len(), 1);
    assert_eq!(
        notifier.delivered[0].body,
        "Your \"Morning pages\" Focus session is starting in 5 minute(s)."
    );

    clock.set(at("2024-01-11T06:57:00+00:00"));
    let events = app.tick_notifications(&mut notifier);
    assert_eq!(events.len(), 1);
    assert_eq!(notifier.delivered.len(), 2);
}

#[test]
fn test_denied_permission_is_silent() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(at("2024-01-10T06:58:00+00:00")));
    let mut app = boot(store, clock);
    app.create_schedule(weekdays("Morning pages", "07:00", "07:30", ScheduleType::Focus))
        .unwrap();
    let mut notifier = Inbox::new(NotificationPermission::Denied);
    assert!(app.tick_notifications(&mut notifier).is_empty());
    assert!(notifier.delivered.is_empty());
}

#[test]
fn test_pomodoro_focus_feeds_ledger_and_starts_break() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(at("2024-01-10T09:00:00+00:00")));
    let mut app = boot(store.clone(), clock.clone());
    app.set_timer_mode(TimerMode::Pomodoro).unwrap();
    app.start_timer();

    let mut events = Vec::new();
    for _ in 0..1500 {
        clock.advance_secs(1);
        events.extend(app.tick_second());
    }

    let snap = app.timer_snapshot();
    assert_eq!(snap.cycle_count, 1);
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.state, TimerState::Running);
    assert_eq!(snap.remaining_seconds, 300);

    let recorded: Vec<&SessionRecord> = events
        .iter()
        .filter_map(|e| match e {
            Event::SessionRecorded { record, .. } => Some(record),
            _ => None,
        })
        .collect();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].duration_minutes, 25);

    let history: Vec<SessionRecord> = load_or_default(&*store, keys::FOCUS_HISTORY);
    assert_eq!(history.len(), 1);

    // The break completes without touching the ledger.
    for _ in 0..300 {
        clock.advance_secs(1);
        app.tick_second();
    }
    assert_eq!(app.ledger().history().len(), 1);
    assert_eq!(app.timer_snapshot().phase, Phase::Focus);
}

#[test]
fn test_daily_session_goal_resets_on_new_day() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(at("2024-01-10T08:00:00+00:00")));
    let mut app = boot(store.clone(), clock.clone());
    app.set_goal(GoalType::SessionCount, 4).unwrap();
    app.set_focus_duration(5).unwrap();

    let run_one = |app: &mut Zenith<Rc<ManualClock>>| {
        app.reset_timer();
        app.start_timer();
        for _ in 0..300 {
            clock.advance_secs(1);
            app.tick_second();
        }
    };
    for _ in 0..4 {
        run_one(&mut app);
    }
    assert_eq!(app.goal().unwrap().progress, 4);

    clock.set(at("2024-01-11T08:00:00+00:00"));
    // Restart on the new day; the stale goal comes back empty.
    let mut app = boot(store, clock.clone());
    assert_eq!(app.ledger().goal().unwrap().progress, 0);
    run_one(&mut app);
    assert_eq!(app.goal().unwrap().progress, 1);
    assert_eq!(app.ledger().total_focus_minutes(), 25);
}

#[test]
fn test_schedule_round_trip_with_legacy_entries() {
    let store: Rc<dyn KvStore> = Rc::new(Database::open_memory().unwrap());
    save(
        &*store,
        keys::SCHEDULES,
        &serde_json::json!([
            {"id": "a", "title": "Old focus", "startTime": "08:00", "endTime": "09:00", "days": [1]},
            {"id": "b", "title": "Old sleep", "startTime": "22:00", "endTime": "23:00", "days": [0, 6], "type": "sleep"},
            {"id": "c", "title": "Broken", "startTime": "25:00", "endTime": "26:00", "days": [1]},
        ]),
    )
    .unwrap();

    let mut repo = ScheduleRepository::load(store.clone());
    assert_eq!(repo.len(), 2);
    assert_eq!(repo.get("a").unwrap().kind, ScheduleType::Focus);
    assert_eq!(repo.get("b").unwrap().kind, ScheduleType::Lockout);

    repo.create(ScheduleDraft {
        title: "Gym".into(),
        start_time: TimeOfDay::new(18, 0).unwrap(),
        end_time: TimeOfDay::new(19, 30).unwrap(),
        days: vec![2, 4],
        kind: ScheduleType::Focus,
    })
    .unwrap();

    let reloaded = ScheduleRepository::load(store);
    assert_eq!(reloaded.schedules(), repo.schedules());
}
