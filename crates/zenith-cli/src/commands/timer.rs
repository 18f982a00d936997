use clap::Subcommand;
use zenith_core::timer::FOCUS_STEP_MINUTES;
use zenith_core::TimerMode;

use super::{open_app, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Set the standard focus length (5-90, snapped to 5 minutes)
    Duration {
        /// Minutes
        minutes: Option<i64>,
        /// Step up by 5 minutes
        #[arg(long, conflicts_with_all = ["minutes", "down"])]
        up: bool,
        /// Step down by 5 minutes
        #[arg(long, conflicts_with = "minutes")]
        down: bool,
    },
    /// Switch between standard and pomodoro
    Mode {
        /// standard or pomodoro
        mode: TimerMode,
    },
    /// Print timer settings and state as JSON
    Show,
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut app = open_app()?;
    match action {
        TimerAction::Duration { minutes, up, down } => {
            let step = i64::from(FOCUS_STEP_MINUTES);
            let applied = match (minutes, up, down) {
                (Some(m), _, _) => app.set_focus_duration(m)?,
                (None, true, _) => app.adjust_focus_duration(step)?,
                (None, _, true) => app.adjust_focus_duration(-step)?,
                (None, false, false) => app.timer().focus_duration(),
            };
            println!("focus duration: {applied} min");
        }
        TimerAction::Mode { mode } => {
            app.set_timer_mode(mode)?;
            println!("timer mode: {mode:?}");
        }
        TimerAction::Show => print_json(&app.timer_snapshot())?,
    }
    Ok(())
}
