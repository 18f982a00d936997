//! Focus session timer: plain countdown or Pomodoro alternation on top of
//! [`TimerEngine`], plus the ambient sound that follows it.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::audio::{AudioController, AudioSink};
use super::engine::{TimerEngine, TimerState};
use super::sounds::FocusSound;
use crate::events::Event;
use crate::storage::PomodoroConfig;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const MIN_FOCUS_MINUTES: u32 = 5;
pub const MAX_FOCUS_MINUTES: u32 = 90;
pub const FOCUS_STEP_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Standard,
    Pomodoro,
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(TimerMode::Standard),
            "pomodoro" => Ok(TimerMode::Pomodoro),
            other => Err(format!("unknown timer mode '{other}' (expected standard|pomodoro)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }
}

/// Clamp a requested focus length to 5..=90 minutes on the 5-minute grid.
pub fn clamp_focus_minutes(minutes: i64) -> u32 {
    let step = i64::from(FOCUS_STEP_MINUTES);
    let snapped = (minutes + step / 2).div_euclid(step) * step;
    snapped.clamp(i64::from(MIN_FOCUS_MINUTES), i64::from(MAX_FOCUS_MINUTES)) as u32
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub phase: Phase,
    pub state: TimerState,
    pub remaining_seconds: u64,
    /// `MM:SS`
    pub display: String,
    pub cycle_count: u32,
    pub focus_duration_minutes: u32,
    pub has_started: bool,
    pub sound_id: &'static str,
}

pub struct FocusTimer {
    engine: TimerEngine,
    mode: TimerMode,
    phase: Phase,
    cycle_count: u32,
    focus_duration: u32,
    pomodoro: PomodoroConfig,
    sound: &'static FocusSound,
    audio: AudioController,
}

impl FocusTimer {
    pub fn new(
        mode: TimerMode,
        focus_duration: u32,
        sound: &'static FocusSound,
        pomodoro: PomodoroConfig,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        let mut timer = Self {
            engine: TimerEngine::new(0),
            mode,
            phase: Phase::Focus,
            cycle_count: 0,
            focus_duration: clamp_focus_minutes(i64::from(focus_duration)),
            pomodoro,
            sound,
            audio: AudioController::new(audio),
        };
        timer.engine.reset(timer.current_duration());
        timer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.engine.remaining_seconds()
    }

    pub fn focus_duration(&self) -> u32 {
        self.focus_duration
    }

    pub fn sound(&self) -> &'static FocusSound {
        self.sound
    }

    pub fn audio(&self) -> &AudioController {
        &self.audio
    }

    /// Minutes the current phase runs for under the current settings.
    pub fn current_duration(&self) -> u32 {
        match (self.mode, self.phase) {
            (TimerMode::Standard, _) => self.focus_duration,
            (TimerMode::Pomodoro, Phase::Focus) => self.pomodoro.focus_minutes,
            (TimerMode::Pomodoro, Phase::Break) => self.pomodoro.break_minutes,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let remaining = self.engine.remaining_seconds();
        TimerSnapshot {
            mode: self.mode,
            phase: self.phase,
            state: self.engine.state(),
            remaining_seconds: remaining,
            display: format!("{:02}:{:02}", remaining / 60, remaining % 60),
            cycle_count: self.cycle_count,
            focus_duration_minutes: self.focus_duration,
            has_started: self.engine.has_started(),
            sound_id: self.sound.id,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load the current phase's duration and run, from any state.
    pub fn start(&mut self, now: DateTime<FixedOffset>) -> Event {
        let minutes = self.current_duration();
        self.engine.start(minutes);
        self.audio.rewind();
        self.sync_audio();
        tracing::info!(mode = ?self.mode, phase = ?self.phase, minutes, "timer started");
        Event::TimerStarted {
            mode: self.mode,
            phase: self.phase,
            duration_secs: self.engine.loaded_seconds(),
            at: now,
        }
    }

    pub fn pause(&mut self, now: DateTime<FixedOffset>) -> Option<Event> {
        if !self.engine.pause() {
            return None;
        }
        self.sync_audio();
        Some(Event::TimerPaused {
            remaining_secs: self.engine.remaining_seconds(),
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<FixedOffset>) -> Option<Event> {
        if !self.engine.resume() {
            return None;
        }
        self.sync_audio();
        Some(Event::TimerResumed {
            remaining_secs: self.engine.remaining_seconds(),
            at: now,
        })
    }

    /// Back to idle. Pomodoro also returns to a fresh focus phase.
    pub fn reset(&mut self, now: DateTime<FixedOffset>) -> Event {
        self.phase = Phase::Focus;
        self.cycle_count = 0;
        self.engine.reset(self.current_duration());
        self.sync_audio();
        Event::TimerReset { at: now }
    }

    /// Advance one second.
    ///
    /// On completion emits `TimerCompleted`. In Pomodoro mode it then flips the
    /// phase (counting the cycle if a focus phase ended) and immediately starts
    /// the next phase.
    pub fn tick(&mut self, now: DateTime<FixedOffset>) -> Vec<Event> {
        if !self.engine.tick() {
            return Vec::new();
        }

        let completed = self.phase;
        let minutes = self.engine.loaded_minutes();
        tracing::info!(mode = ?self.mode, phase = ?completed, minutes, "timer completed");
        let mut events = vec![Event::TimerCompleted {
            mode: self.mode,
            phase: completed,
            duration_minutes: minutes,
            at: now,
        }];

        match self.mode {
            TimerMode::Standard => self.sync_audio(),
            TimerMode::Pomodoro => {
                if completed == Phase::Focus {
                    self.cycle_count += 1;
                }
                self.phase = completed.next();
                events.push(Event::PhaseChanged {
                    phase: self.phase,
                    cycle_count: self.cycle_count,
                    at: now,
                });
                events.push(self.start(now));
            }
        }
        events
    }

    /// Set the standard-mode focus length. Returns the clamped value. Only an
    /// idle countdown picks it up immediately.
    pub fn set_focus_duration(&mut self, minutes: i64) -> u32 {
        self.focus_duration = clamp_focus_minutes(minutes);
        self.engine.reload_if_idle(self.current_duration());
        self.focus_duration
    }

    /// Step the focus length by `delta` minutes.
    pub fn adjust_focus_duration(&mut self, delta: i64) -> u32 {
        self.set_focus_duration(i64::from(self.focus_duration) + delta)
    }

    /// Switch mode; a change resets the timer.
    pub fn set_mode(&mut self, mode: TimerMode, now: DateTime<FixedOffset>) -> Option<Event> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        Some(self.reset(now))
    }

    pub fn set_pomodoro(&mut self, pomodoro: PomodoroConfig) {
        self.pomodoro = pomodoro;
        self.engine.reload_if_idle(self.current_duration());
    }

    /// Change the ambient sound without touching the countdown.
    pub fn select_sound(&mut self, sound: &'static FocusSound) {
        self.sound = sound;
        self.sync_audio();
    }

    fn sync_audio(&mut self) {
        self.audio.sync(self.engine.is_running(), self.sound.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::audio::testing::{AudioCall, RecordingAudio};
    use crate::timer::sounds::FOCUS_SOUNDS;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-10T09:00:00+00:00").unwrap()
    }

    fn timer(mode: TimerMode) -> (RecordingAudio, FocusTimer) {
        let audio = RecordingAudio::new();
        let timer = FocusTimer::new(
            mode,
            25,
            &FOCUS_SOUNDS[0],
            PomodoroConfig::default(),
            Box::new(audio.clone()),
        );
        audio.take();
        (audio, timer)
    }

    fn run_ticks(timer: &mut FocusTimer, n: usize) -> Vec<Event> {
        (0..n).flat_map(|_| timer.tick(now())).collect()
    }

    #[test]
    fn clamps_to_grid() {
        assert_eq!(clamp_focus_minutes(0), 5);
        assert_eq!(clamp_focus_minutes(27), 25);
        assert_eq!(clamp_focus_minutes(28), 30);
        assert_eq!(clamp_focus_minutes(120), 90);
        assert_eq!(clamp_focus_minutes(-40), 5);
    }

    #[test]
    fn standard_finishes_once_without_restart() {
        let (_, mut timer) = timer(TimerMode::Standard);
        timer.start(now());
        let events = run_ticks(&mut timer, 1500);

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::TimerCompleted { phase: Phase::Focus, duration_minutes: 25, .. }
        ));
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(timer.remaining_seconds(), 0);

        assert!(run_ticks(&mut timer, 60).is_empty());
        assert_eq!(timer.state(), TimerState::Finished);
    }

    #[test]
    fn pomodoro_focus_completion_chains_into_break() {
        let (_, mut timer) = timer(TimerMode::Pomodoro);
        timer.start(now());
        let events = run_ticks(&mut timer, 1500);

        assert!(matches!(
            events.as_slice(),
            [
                Event::TimerCompleted { phase: Phase::Focus, duration_minutes: 25, .. },
                Event::PhaseChanged { phase: Phase::Break, cycle_count: 1, .. },
                Event::TimerStarted { phase: Phase::Break, duration_secs: 300, .. },
            ]
        ));
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining_seconds(), 300);
        assert_eq!(timer.cycle_count(), 1);

        // Break completion flips back to focus without counting a cycle.
        let events = run_ticks(&mut timer, 300);
        assert!(matches!(
            events.as_slice(),
            [
                Event::TimerCompleted { phase: Phase::Break, duration_minutes: 5, .. },
                Event::PhaseChanged { phase: Phase::Focus, cycle_count: 1, .. },
                Event::TimerStarted { phase: Phase::Focus, .. },
            ]
        ));
    }

    #[test]
    fn pause_and_resume() {
        let (_, mut timer) = timer(TimerMode::Standard);
        assert!(timer.pause(now()).is_none());
        timer.start(now());
        run_ticks(&mut timer, 10);
        assert!(timer.pause(now()).is_some());
        run_ticks(&mut timer, 10);
        assert_eq!(timer.remaining_seconds(), 1490);
        assert!(timer.resume(now()).is_some());
        assert!(timer.resume(now()).is_none());
    }

    #[test]
    fn duration_changes_apply_only_when_idle() {
        let (_, mut timer) = timer(TimerMode::Standard);
        assert_eq!(timer.set_focus_duration(30), 30);
        assert_eq!(timer.remaining_seconds(), 1800);

        timer.start(now());
        assert_eq!(timer.adjust_focus_duration(5), 35);
        assert_eq!(timer.remaining_seconds(), 1800);
        timer.pause(now());
        timer.set_focus_duration(45);
        assert_eq!(timer.remaining_seconds(), 1800);

        // Reset picks up the current setting.
        timer.reset(now());
        assert_eq!(timer.remaining_seconds(), 45 * 60);
    }

    #[test]
    fn reset_returns_pomodoro_to_first_focus() {
        let (_, mut timer) = timer(TimerMode::Pomodoro);
        timer.start(now());
        run_ticks(&mut timer, 1500);
        assert_eq!(timer.phase(), Phase::Break);

        timer.reset(now());
        assert_eq!(timer.phase(), Phase::Focus);
        assert_eq!(timer.cycle_count(), 0);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_seconds(), 1500);
    }

    #[test]
    fn mode_switch_resets() {
        let (_, mut timer) = timer(TimerMode::Standard);
        timer.set_focus_duration(60);
        timer.start(now());
        assert!(timer.set_mode(TimerMode::Standard, now()).is_none());
        assert!(timer.set_mode(TimerMode::Pomodoro, now()).is_some());
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_seconds(), 1500);
    }

    #[test]
    fn audio_follows_running_state() {
        let (audio, mut timer) = timer(TimerMode::Standard);
        timer.start(now());
        assert_eq!(
            audio.take(),
            vec![
                AudioCall::SeekToStart,
                AudioCall::SetSource(FOCUS_SOUNDS[0].url.into()),
                AudioCall::Play,
            ]
        );

        timer.pause(now());
        assert_eq!(audio.take(), vec![AudioCall::Pause]);
        timer.resume(now());
        assert_eq!(audio.take(), vec![AudioCall::Play]);

        // Switching sound mid-run changes source without touching the countdown.
        run_ticks(&mut timer, 3);
        timer.select_sound(&FOCUS_SOUNDS[2]);
        assert_eq!(
            audio.take(),
            vec![AudioCall::SetSource(FOCUS_SOUNDS[2].url.into()), AudioCall::Play]
        );
        assert_eq!(timer.remaining_seconds(), 1497);

        // Mute pauses; completion leaves audio paused.
        timer.select_sound(&FOCUS_SOUNDS[3]);
        assert_eq!(audio.take(), vec![AudioCall::Pause]);
        run_ticks(&mut timer, 1497);
        assert!(audio.take().is_empty());
        assert!(!timer.audio().is_playing());
    }

    #[test]
    fn snapshot_formats_display() {
        let (_, mut timer) = timer(TimerMode::Standard);
        timer.start(now());
        run_ticks(&mut timer, 61);
        let snap = timer.snapshot();
        assert_eq!(snap.display, "23:59");
        assert!(snap.has_started);
        assert_eq!(snap.sound_id, "rain");
    }
}
