use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use zenith_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "zenith", version, about = "Zenith focus and lockout scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recurring focus and lockout schedules
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Print what is active right now as JSON
    Status,
    /// Focus timer settings
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Ambient focus sounds
    Sound {
        #[command(subcommand)]
        action: commands::sound::SoundAction,
    },
    /// Daily focus goal
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Completed focus sessions
    History {
        /// today, week, or all
        #[arg(long, default_value = "all")]
        filter: zenith_core::HistoryFilter,
    },
    /// Focus and usage totals
    Stats,
    /// Session to-do list
    Todo {
        #[command(subcommand)]
        action: commands::todo::TodoAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the tick loop in the foreground, printing events as JSON lines
    Run(commands::run::RunArgs),
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Filter from ZENITH_LOG, then an existing config file, then `warn`. Logs go
/// to stderr. Never writes the config file.
fn init_logging() {
    let directive = std::env::var("ZENITH_LOG").unwrap_or_else(|_| {
        Config::read_existing()
            .unwrap_or_default()
            .logging
            .filter
    });
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Status => commands::status::run(),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Sound { action } => commands::sound::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::History { filter } => commands::stats::history(filter),
        Commands::Stats => commands::stats::run(),
        Commands::Todo { action } => commands::todo::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run(args) => commands::run::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "zenith", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
