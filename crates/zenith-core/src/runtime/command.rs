//! Control lines for a running driver.

use std::str::FromStr;

use super::Zenith;
use crate::clock::Clock;
use crate::error::{CommandError, Result};
use crate::events::Event;
use crate::timer::TimerMode;

/// A user action delivered to [`super::Driver::run_with_commands`].
///
/// Parsed from one whitespace-separated line, e.g. `lockout 15` or
/// `mode pomodoro`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartTimer,
    PauseTimer,
    ResumeTimer,
    ResetTimer,
    StartLockout(i64),
    CancelLockout,
    SetDuration(i64),
    SetMode(TimerMode),
    SelectSound(String),
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let verb = verb.to_ascii_lowercase();
        let arg = words.next();

        let minutes = |command: &'static str| -> std::result::Result<i64, CommandError> {
            let raw = arg.ok_or(CommandError::MissingArgument(command))?;
            raw.parse::<i64>().map_err(|_| CommandError::InvalidArgument {
                command,
                message: format!("'{raw}' is not a whole number of minutes"),
            })
        };

        let command = match verb.as_str() {
            "start" => Command::StartTimer,
            "pause" => Command::PauseTimer,
            "resume" => Command::ResumeTimer,
            "reset" => Command::ResetTimer,
            "lockout" => Command::StartLockout(minutes("lockout")?),
            "unlock" => Command::CancelLockout,
            "duration" => Command::SetDuration(minutes("duration")?),
            "mode" => {
                let raw = arg.ok_or(CommandError::MissingArgument("mode"))?;
                Command::SetMode(raw.parse::<TimerMode>().map_err(|message| {
                    CommandError::InvalidArgument {
                        command: "mode",
                        message,
                    }
                })?)
            }
            "sound" => Command::SelectSound(
                arg.ok_or(CommandError::MissingArgument("sound"))?
                    .to_string(),
            ),
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

impl<C: Clock> Zenith<C> {
    /// Carry out one control command. `Quit` is the driver's concern and
    /// yields nothing here.
    ///
    /// # Errors
    /// Whatever the underlying operation returns.
    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>> {
        let events = match command {
            Command::StartTimer => vec![self.start_timer()],
            Command::PauseTimer => self.pause_timer().into_iter().collect(),
            Command::ResumeTimer => self.resume_timer().into_iter().collect(),
            Command::ResetTimer => vec![self.reset_timer()],
            Command::StartLockout(minutes) => self.start_quick_lockout(minutes)?,
            Command::CancelLockout => self.cancel_quick_lockout(),
            Command::SetDuration(minutes) => {
                let applied = self.set_focus_duration(minutes)?;
                tracing::info!(minutes = applied, "focus duration set");
                Vec::new()
            }
            Command::SetMode(mode) => self.set_timer_mode(mode)?.into_iter().collect(),
            Command::SelectSound(id) => {
                let sound = self.select_sound(&id)?;
                tracing::info!(sound = sound.id, "sound selected");
                Vec::new()
            }
            Command::Quit => Vec::new(),
        };
        Ok(events)
    }
}
