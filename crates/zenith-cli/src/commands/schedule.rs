use clap::{Args, Subcommand};
use zenith_core::{ScheduleDraft, ScheduleType, TimeOfDay};

use super::{open_app, print_json, CmdResult};

#[derive(Args)]
pub struct ScheduleFields {
    /// Display title
    #[arg(long)]
    title: String,
    /// Start time, HH:MM
    #[arg(long)]
    start: TimeOfDay,
    /// End time, HH:MM (exclusive)
    #[arg(long)]
    end: TimeOfDay,
    /// Weekdays, 0 = Sunday .. 6 = Saturday (e.g. "1,2,3,4,5")
    #[arg(long, value_delimiter = ',', required = true)]
    days: Vec<u8>,
    /// focus or lockout
    #[arg(long = "type", default_value = "focus")]
    kind: ScheduleType,
}

impl From<ScheduleFields> for ScheduleDraft {
    fn from(f: ScheduleFields) -> Self {
        ScheduleDraft {
            title: f.title,
            start_time: f.start,
            end_time: f.end,
            days: f.days,
            kind: f.kind,
        }
    }
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// List schedules as JSON
    List,
    /// Add a schedule
    Add(ScheduleFields),
    /// Replace a schedule's fields
    Update {
        /// Schedule ID
        id: String,
        #[command(flatten)]
        fields: ScheduleFields,
    },
    /// Remove a schedule
    Remove {
        /// Schedule ID
        id: String,
    },
}

pub fn run(action: ScheduleAction) -> CmdResult {
    let mut app = open_app()?;
    match action {
        ScheduleAction::List => print_json(app.schedules())?,
        ScheduleAction::Add(fields) => {
            let schedule = app.create_schedule(fields.into())?;
            print_json(&schedule)?;
        }
        ScheduleAction::Update { id, fields } => {
            let schedule = app.update_schedule(&id, fields.into())?;
            print_json(&schedule)?;
        }
        ScheduleAction::Remove { id } => {
            let removed = app.delete_schedule(&id)?;
            println!("removed {} ({})", removed.id, removed.title);
        }
    }
    Ok(())
}
