use crate::command::{CommandChannel, CommandSink};
use crate::config::Config;
use crate::mission::{MissionPager, MissionStore};
use crate::notifier::Notifier;
use crate::supervisor::Arbiter;
use crate::telemetry::TelemetrySnapshot;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Struct holding the key components of the application: telemetry cache,
/// command channel, intervention arbiter, mission pager and notifier.
///
/// Cloning is cheap; every subsystem receives its own copy instead of
/// reaching for global state.
#[derive(Clone)]
pub struct Keychain {
    /// Runtime configuration read at startup.
    config: Arc<Config>,
    /// Last received value of every telemetry kind.
    telemetry: Arc<TelemetrySnapshot>,
    /// Serialized path to the autopilot.
    cmd: Arc<CommandChannel>,
    /// Queue every hold/resume goes through.
    arbiter: Arc<Arbiter>,
    /// Mission and page bookkeeping.
    pager: Arc<MissionPager>,
    /// Log and status sink towards the operator.
    notifier: Arc<Notifier>,
    /// Cancelled once on shutdown.
    shutdown: CancellationToken,
}

impl Keychain {
    /// Wires up all subsystems on top of the given autopilot sink and mission store.
    ///
    /// Must be called from within a tokio runtime since the arbiter task is
    /// spawned immediately.
    pub fn new(
        config: Config,
        sink: Arc<dyn CommandSink>,
        store: Arc<dyn MissionStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self::with_telemetry(config, sink, store, Arc::new(TelemetrySnapshot::new()), shutdown)
    }

    /// Like [`Keychain::new`], on top of a telemetry cache that is already being fed.
    pub fn with_telemetry(
        config: Config,
        sink: Arc<dyn CommandSink>,
        store: Arc<dyn MissionStore>,
        telemetry: Arc<TelemetrySnapshot>,
        shutdown: CancellationToken,
    ) -> Self {
        let notifier = Arc::new(Notifier::new());
        let cmd = Arc::new(CommandChannel::new(sink));
        let arbiter = Arbiter::spawn(
            Arc::clone(&cmd),
            Arc::clone(&telemetry),
            Arc::clone(&notifier),
            shutdown.clone(),
        );
        let pager = Arc::new(MissionPager::new(
            config.paging,
            Arc::clone(&cmd),
            Arc::clone(&telemetry),
            Arc::clone(&arbiter),
            store,
        ));
        Self { config: Arc::new(config), telemetry, cmd, arbiter, pager, notifier, shutdown }
    }

    pub fn config(&self) -> Arc<Config> { Arc::clone(&self.config) }

    pub fn telemetry(&self) -> Arc<TelemetrySnapshot> { Arc::clone(&self.telemetry) }

    pub fn cmd(&self) -> Arc<CommandChannel> { Arc::clone(&self.cmd) }

    pub fn arbiter(&self) -> Arc<Arbiter> { Arc::clone(&self.arbiter) }

    pub fn pager(&self) -> Arc<MissionPager> { Arc::clone(&self.pager) }

    pub fn notifier(&self) -> Arc<Notifier> { Arc::clone(&self.notifier) }

    pub fn shutdown(&self) -> CancellationToken { self.shutdown.clone() }
}
