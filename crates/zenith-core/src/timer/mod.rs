pub mod audio;
mod engine;
mod session;
mod sounds;

pub use audio::{AudioController, AudioSink, NullAudio};
pub use engine::{TimerEngine, TimerState};
pub use session::{
    clamp_focus_minutes, FocusTimer, Phase, TimerMode, TimerSnapshot, DEFAULT_FOCUS_MINUTES,
    FOCUS_STEP_MINUTES, MAX_FOCUS_MINUTES, MIN_FOCUS_MINUTES,
};
pub use sounds::{FocusSound, FOCUS_SOUNDS};
