use super::{open_app, print_json, CmdResult};

/// Resolve activation for now. Quick lockouts only live inside `zenith run`,
/// so only recurring schedules can show up here.
pub fn run() -> CmdResult {
    let app = open_app()?;
    print_json(&app.status())
}
