use clap::Subcommand;
use zenith_core::FOCUS_SOUNDS;

use super::{open_app, CmdResult};

#[derive(Subcommand)]
pub enum SoundAction {
    /// List the sound catalog, marking the selected one
    List,
    /// Select a sound by id
    Set {
        /// Sound ID (rain, forest, ocean, mute)
        id: String,
    },
}

pub fn run(action: SoundAction) -> CmdResult {
    let mut app = open_app()?;
    match action {
        SoundAction::List => {
            let selected = app.timer().sound().id;
            for sound in &FOCUS_SOUNDS {
                let mark = if sound.id == selected { "*" } else { " " };
                println!("{mark} {:<8} {}", sound.id, sound.name);
            }
        }
        SoundAction::Set { id } => {
            let sound = app.select_sound(&id)?;
            println!("sound: {}", sound.name);
        }
    }
    Ok(())
}
