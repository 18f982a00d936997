use clap::Args;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use zenith_core::{
    Command, Driver, Event, Notification, NotificationPermission, Notifier, TickPeriods,
};

use super::{open_app, CmdResult};

/// Control lines read from stdin while running: start, pause, resume, reset,
/// lockout <min>, unlock, duration <min>, mode <standard|pomodoro>,
/// sound <id>, quit.
#[derive(Args)]
pub struct RunArgs {
    /// Start the focus timer right away
    #[arg(long)]
    focus: bool,
    /// Start a quick lockout of this many minutes
    #[arg(long, value_name = "MINUTES")]
    lockout: Option<i64>,
}

/// Terminal notifier: bell plus a line on stderr.
struct TerminalNotifier {
    permission: NotificationPermission,
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&mut self, notification: &Notification) -> std::io::Result<()> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "\x07[{}] {}", notification.title, notification.body)
    }
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "failed to encode event"),
    }
}

/// Forward parsed stdin lines to the driver until EOF.
fn spawn_stdin_reader(commands: mpsc::UnboundedSender<Command>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin closed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if commands.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            }
        }
    });
}

pub fn run(args: RunArgs) -> CmdResult {
    let mut app = open_app()?;
    let mut notifier = TerminalNotifier {
        permission: app.config().notifications.effective_permission(),
    };

    if let Some(minutes) = args.lockout {
        app.start_quick_lockout(minutes)?.iter().for_each(print_event);
    }
    if args.focus {
        print_event(&app.start_timer());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (commands, mut received) = mpsc::unbounded_channel();
    spawn_stdin_reader(commands);

    let summary = runtime.block_on(async {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        };
        Driver::new(TickPeriods::default())
            .run_with_commands(&mut app, &mut notifier, shutdown, &mut received, print_event)
            .await
    });
    tracing::info!(?summary, "stopped");
    Ok(())
}
