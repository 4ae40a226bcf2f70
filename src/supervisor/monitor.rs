use crate::command::CommandError;
use crate::keychain::Keychain;
use crate::mission::PagingError;
use crate::notifier::LogLevel;
use crate::event;
use async_trait::async_trait;
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, time::Duration};
use strum_macros::Display;
use tokio::time::sleep;

#[derive(Debug, Display)]
pub enum MonitorError {
    Paging(PagingError),
    Command(CommandError),
}

impl std::error::Error for MonitorError {}

impl From<PagingError> for MonitorError {
    fn from(value: PagingError) -> Self { MonitorError::Paging(value) }
}

impl From<CommandError> for MonitorError {
    fn from(value: CommandError) -> Self { MonitorError::Command(value) }
}

/// One anomaly check, polled forever by [`run_monitor`].
///
/// A monitor keeps its rolling state to itself and acts only through the
/// keychain's arbiter and pager.
#[async_trait]
pub trait Monitor: Send {
    fn name(&self) -> &'static str;
    /// Delay between two ticks.
    fn period(&self) -> Duration;
    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError>;
}

/// Delay before polling again after a failed or panicked tick.
const FAILURE_BACKOFF: Duration = Duration::from_secs(1);

/// Polls `monitor` until shutdown.
///
/// A tick returning an error or panicking is reported and followed by
/// [`FAILURE_BACKOFF`]; it never ends the loop. A running tick is allowed to
/// finish so no intervention is cut in half.
pub async fn run_monitor(mut monitor: Box<dyn Monitor>, k: Keychain) {
    let shutdown = k.shutdown();
    let notifier = k.notifier();
    let name = monitor.name();
    event!("Monitor {name} started");
    loop {
        let wait = match AssertUnwindSafe(monitor.tick(&k)).catch_unwind().await {
            Ok(Ok(())) => monitor.period(),
            Ok(Err(e)) => {
                notifier.log(LogLevel::Error, format!("Monitor {name} failed: {e}"));
                FAILURE_BACKOFF
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                notifier.log(LogLevel::Error, format!("Monitor {name} panicked: {reason}"));
                FAILURE_BACKOFF
            }
        };
        tokio::select! {
            () = shutdown.cancelled() => break,
            () = sleep(wait) => {}
        }
    }
    event!("Monitor {name} stopped");
}
