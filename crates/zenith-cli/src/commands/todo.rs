use clap::Subcommand;

use super::{open_app, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TodoAction {
    /// List to-dos
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a to-do
    Add {
        /// To-do text
        text: String,
    },
    /// Toggle completion
    Toggle {
        /// To-do ID
        id: String,
    },
    /// Remove a to-do
    Remove {
        /// To-do ID
        id: String,
    },
}

pub fn run(action: TodoAction) -> CmdResult {
    let mut app = open_app()?;
    let todos = app.todos_mut();
    match action {
        TodoAction::List { json: true } => print_json(todos.items())?,
        TodoAction::List { json: false } => {
            for todo in todos.items() {
                let mark = if todo.completed { "x" } else { " " };
                println!("[{mark}] {}  {}", todo.text, todo.id);
            }
        }
        TodoAction::Add { text } => {
            let todo = todos.add(&text)?;
            println!("added {}", todo.id);
        }
        TodoAction::Toggle { id } => {
            let completed = todos.toggle(&id)?;
            println!("{}", if completed { "done" } else { "open" });
        }
        TodoAction::Remove { id } => {
            let removed = todos.delete(&id)?;
            println!("removed {}", removed.text);
        }
    }
    Ok(())
}
