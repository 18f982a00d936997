use clap::Subcommand;
use zenith_core::GoalType;

use super::{open_app, CmdResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Set today's goal, replacing any current one
    Set {
        /// sessions or duration
        goal_type: GoalType,
        /// Sessions, or minutes for a duration goal
        target: i64,
    },
    /// Show progress toward the goal
    Show,
    /// Remove the goal
    Clear,
}

pub fn run(action: GoalAction) -> CmdResult {
    let mut app = open_app()?;
    match action {
        GoalAction::Set { goal_type, target } => {
            let goal = app.set_goal(goal_type, target)?;
            println!("goal set: {} {}", goal.target, unit(goal.goal_type));
        }
        GoalAction::Show => match app.goal() {
            Some(goal) => println!(
                "{}/{} {} ({:.0}%)",
                goal.progress,
                goal.target,
                unit(goal.goal_type),
                goal.percent()
            ),
            None => println!("no goal set"),
        },
        GoalAction::Clear => {
            app.clear_goal()?;
            println!("goal cleared");
        }
    }
    Ok(())
}

fn unit(goal_type: GoalType) -> &'static str {
    match goal_type {
        GoalType::SessionCount => "sessions",
        GoalType::DurationMinutes => "min",
    }
}
