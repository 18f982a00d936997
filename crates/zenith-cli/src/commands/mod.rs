pub mod config;
pub mod goal;
pub mod run;
pub mod schedule;
pub mod sound;
pub mod stats;
pub mod status;
pub mod timer;
pub mod todo;

use std::rc::Rc;
use zenith_core::timer::NullAudio;
use zenith_core::{Config, Database, SystemClock, Zenith};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk store and load the app against the system clock.
pub fn open_app() -> Result<Zenith<SystemClock>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(Zenith::new(
        Rc::new(db),
        SystemClock,
        Config::load_or_default(),
        Box::new(NullAudio),
    ))
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
