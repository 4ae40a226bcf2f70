use crate::command::{CommandChannel, CommandError};
use crate::notifier::{LogLevel, Notifier};
use crate::telemetry::TelemetrySnapshot;
use crate::{event, warn};
use std::{sync::Arc, time::Duration};
use strum_macros::Display;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{Instant, sleep},
};
use tokio_util::sync::CancellationToken;

/// A corrective action funnelled through the [`Arbiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Intervention {
    /// Disarm and stop.
    Hold,
    /// Stop, then point the autopilot back at the waypoint it was driving to.
    HoldKeepWaypoint,
    /// Enter Auto and arm.
    Start,
    /// Stop, wait for `pause`, start again.
    Cycle { pause: Duration },
    /// Cut actuator power and stop.
    Kill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterventionOutcome {
    Executed,
    /// A stop/resume cycle requested before the latest intervention finished;
    /// its fault was already acted upon.
    Superseded,
    Failed(CommandError),
    /// The arbiter has shut down.
    Closed,
}

impl From<Result<(), CommandError>> for InterventionOutcome {
    fn from(value: Result<(), CommandError>) -> Self {
        match value {
            Ok(()) => InterventionOutcome::Executed,
            Err(e) => InterventionOutcome::Failed(e),
        }
    }
}

struct InterventionRequest {
    source: &'static str,
    action: Intervention,
    issued: Instant,
    reply: oneshot::Sender<InterventionOutcome>,
}

/// Single writer for every hold/resume the rover receives.
///
/// Requests are queued and executed strictly one after another by a
/// dedicated task, which also keeps the instant the last intervention
/// completed for cooldown-gated monitors.
pub struct Arbiter {
    tx: mpsc::Sender<InterventionRequest>,
    last: watch::Receiver<Option<Instant>>,
}

impl Arbiter {
    const QUEUE_SIZE: usize = 16;

    /// Spawns the executing task and returns the handle requests go through.
    pub fn spawn(
        cmd: Arc<CommandChannel>,
        telemetry: Arc<TelemetrySnapshot>,
        notifier: Arc<Notifier>,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(Self::QUEUE_SIZE);
        let (last_tx, last) = watch::channel(None);
        let worker = ArbiterWorker { cmd, telemetry, notifier, last: last_tx };
        tokio::spawn(worker.run(rx, shutdown));
        Arc::new(Self { tx, last })
    }

    /// Instant the most recent intervention completed, if any happened yet.
    pub fn last_intervention(&self) -> Option<Instant> { *self.last.borrow() }

    /// Whether at least `cooldown` has passed since the last intervention.
    pub fn cooldown_elapsed(&self, cooldown: Duration) -> bool {
        self.last_intervention().is_none_or(|last| last.elapsed() > cooldown)
    }

    pub async fn request(&self, source: &'static str, action: Intervention) -> InterventionOutcome {
        let (reply, rx) = oneshot::channel();
        let req = InterventionRequest { source, action, issued: Instant::now(), reply };
        if self.tx.send(req).await.is_err() {
            return InterventionOutcome::Closed;
        }
        rx.await.unwrap_or(InterventionOutcome::Closed)
    }

    pub async fn hold(&self, source: &'static str) -> InterventionOutcome {
        self.request(source, Intervention::Hold).await
    }

    pub async fn hold_keep_waypoint(&self, source: &'static str) -> InterventionOutcome {
        self.request(source, Intervention::HoldKeepWaypoint).await
    }

    pub async fn start(&self, source: &'static str) -> InterventionOutcome {
        self.request(source, Intervention::Start).await
    }

    pub async fn cycle(&self, source: &'static str, pause: Duration) -> InterventionOutcome {
        self.request(source, Intervention::Cycle { pause }).await
    }

    pub async fn kill(&self, source: &'static str) -> InterventionOutcome {
        self.request(source, Intervention::Kill).await
    }
}

struct ArbiterWorker {
    cmd: Arc<CommandChannel>,
    telemetry: Arc<TelemetrySnapshot>,
    notifier: Arc<Notifier>,
    last: watch::Sender<Option<Instant>>,
}

impl ArbiterWorker {
    async fn run(self, mut rx: mpsc::Receiver<InterventionRequest>, shutdown: CancellationToken) {
        loop {
            let req = tokio::select! {
                () = shutdown.cancelled() => break,
                req = rx.recv() => match req {
                    Some(req) => req,
                    None => break,
                },
            };
            let outcome = self.execute(&req).await;
            let _ = req.reply.send(outcome);
        }
        event!("Arbiter stopped");
    }

    async fn execute(&self, req: &InterventionRequest) -> InterventionOutcome {
        let last = *self.last.borrow();
        if matches!(req.action, Intervention::Cycle { .. }) && last.is_some_and(|l| req.issued < l) {
            warn!("Dropping {} request from {}, superseded by a later intervention", req.action, req.source);
            return InterventionOutcome::Superseded;
        }
        event!("Executing {} for {}", req.action, req.source);
        let res = match req.action {
            Intervention::Hold => self.cmd.hold().await,
            Intervention::HoldKeepWaypoint => self.hold_keep_waypoint().await,
            Intervention::Start => self.cmd.start().await,
            Intervention::Cycle { pause } => self.cycle(pause).await,
            Intervention::Kill => self.kill().await,
        };
        self.last.send_replace(Some(Instant::now()));
        if let Err(e) = &res {
            self.notifier.log(LogLevel::Error, format!("{} for {} failed: {e}", req.action, req.source));
        }
        res.into()
    }

    async fn hold_keep_waypoint(&self) -> Result<(), CommandError> {
        let seq = self.telemetry.seq().await.unwrap_or(1);
        self.cmd.hold().await?;
        self.cmd.set_active_waypoint(seq).await
    }

    async fn cycle(&self, pause: Duration) -> Result<(), CommandError> {
        self.hold_keep_waypoint().await?;
        sleep(pause).await;
        self.cmd.start().await
    }

    async fn kill(&self) -> Result<(), CommandError> {
        self.cmd.set_actuator_power(false).await?;
        self.hold_keep_waypoint().await
    }
}
