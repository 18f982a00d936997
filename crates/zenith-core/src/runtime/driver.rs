//! Async tick driver.
//!
//! Three intervals (1 s activation/timer, 30 s notifications, 60 s usage)
//! multiplexed with `select!` on the calling task. Each cadence can be
//! cancelled on its own through [`TickHandle`]; the loop ends on shutdown or
//! once all three are cancelled. Control [`Command`]s arriving on a channel
//! are applied between ticks.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{Command, Zenith};
use crate::clock::Clock;
use crate::events::Event;
use crate::notify::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Second,
    Notification,
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPeriods {
    pub second: Duration,
    pub notification: Duration,
    pub usage: Duration,
}

impl Default for TickPeriods {
    fn default() -> Self {
        Self {
            second: Duration::from_secs(1),
            notification: Duration::from_secs(30),
            usage: Duration::from_secs(60),
        }
    }
}

/// Cancels cadences of a running [`Driver`]. Cancelling twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct TickHandle {
    second: CancellationToken,
    notification: CancellationToken,
    usage: CancellationToken,
    shutdown: CancellationToken,
}

impl TickHandle {
    pub fn cancel(&self, kind: TickKind) {
        self.token(kind).cancel();
    }

    pub fn is_cancelled(&self, kind: TickKind) -> bool {
        self.token(kind).is_cancelled()
    }

    /// Stop the whole loop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn all_cancelled(&self) -> bool {
        [TickKind::Second, TickKind::Notification, TickKind::Usage]
            .into_iter()
            .all(|kind| self.is_cancelled(kind))
    }

    fn token(&self, kind: TickKind) -> &CancellationToken {
        match kind {
            TickKind::Second => &self.second,
            TickKind::Notification => &self.notification,
            TickKind::Usage => &self.usage,
        }
    }
}

/// Tick counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub second_ticks: u64,
    pub notification_ticks: u64,
    pub usage_ticks: u64,
}

/// An interval that parks forever once its token is cancelled.
struct Ticker {
    interval: Option<Interval>,
    cancel: CancellationToken,
}

impl Ticker {
    fn new(period: Duration, cancel: CancellationToken) -> Self {
        let interval = (!cancel.is_cancelled()).then(|| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        Self { interval, cancel }
    }

    /// Resolves `true` on a tick, `false` once when cancelled.
    async fn next(&mut self) -> bool {
        let Some(interval) = self.interval.as_mut() else {
            return std::future::pending().await;
        };
        let fired = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = interval.tick() => true,
        };
        if !fired {
            self.interval = None;
        }
        fired
    }
}

#[derive(Debug, Default)]
pub struct Driver {
    periods: TickPeriods,
    handle: TickHandle,
}

impl Driver {
    pub fn new(periods: TickPeriods) -> Self {
        Self {
            periods,
            handle: TickHandle::default(),
        }
    }

    pub fn handle(&self) -> TickHandle {
        self.handle.clone()
    }

    /// Drive `app` until `shutdown` resolves, [`TickHandle::shutdown`] is
    /// called, or every cadence is cancelled. Every event goes to `on_event`.
    pub async fn run<C, F>(
        &self,
        app: &mut Zenith<C>,
        notifier: &mut dyn Notifier,
        shutdown: impl Future<Output = ()>,
        on_event: F,
    ) -> RunSummary
    where
        C: Clock,
        F: FnMut(&Event),
    {
        let (_, mut idle) = mpsc::unbounded_channel();
        self.run_with_commands(app, notifier, shutdown, &mut idle, on_event)
            .await
    }

    /// Like [`Self::run`], also applying every command received on
    /// `commands`. `Command::Quit` ends the loop; a closed channel only stops
    /// command handling. A failed command is logged and the loop goes on.
    pub async fn run_with_commands<C, F>(
        &self,
        app: &mut Zenith<C>,
        notifier: &mut dyn Notifier,
        shutdown: impl Future<Output = ()>,
        commands: &mut mpsc::UnboundedReceiver<Command>,
        mut on_event: F,
    ) -> RunSummary
    where
        C: Clock,
        F: FnMut(&Event),
    {
        let mut second = Ticker::new(self.periods.second, self.handle.second.clone());
        let mut notification =
            Ticker::new(self.periods.notification, self.handle.notification.clone());
        let mut usage = Ticker::new(self.periods.usage, self.handle.usage.clone());
        let mut summary = RunSummary::default();
        let mut listening = true;
        tokio::pin!(shutdown);

        tracing::debug!(periods = ?self.periods, "tick driver started");
        while !self.handle.all_cancelled() {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.handle.shutdown.cancelled() => break,
                command = commands.recv(), if listening => match command {
                    None => listening = false,
                    Some(Command::Quit) => break,
                    Some(command) => {
                        tracing::debug!(?command, "control command");
                        match app.apply(command) {
                            Ok(events) => events.iter().for_each(&mut on_event),
                            Err(e) => tracing::warn!(error = %e, "command failed"),
                        }
                    }
                },
                fired = second.next() => {
                    if fired {
                        summary.second_ticks += 1;
                        app.tick_second().iter().for_each(&mut on_event);
                    }
                }
                fired = notification.next() => {
                    if fired {
                        summary.notification_ticks += 1;
                        app.tick_notifications(notifier).iter().for_each(&mut on_event);
                    }
                }
                fired = usage.next() => {
                    if fired {
                        summary.usage_ticks += 1;
                        let total = app.tick_usage();
                        tracing::trace!(total, "usage minute");
                    }
                }
            }
        }
        tracing::debug!(?summary, "tick driver stopped");
        summary
    }
}
