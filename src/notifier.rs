use crate::status::StatusSummary;
use crate::{error, event, info, sv, warn};
use strum_macros::Display;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Something worth telling a connected operator console.
#[derive(Debug, Clone)]
pub enum Notification {
    Log { level: LogLevel, message: String },
    Status(Box<StatusSummary>),
}

/// Fire-and-forget sink for log lines and status summaries.
///
/// Every message is printed locally and forwarded to whoever subscribed;
/// having no subscriber is not an error.
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self { Self::new() }
}

impl Notifier {
    const CHANNEL_SIZE: usize = 64;

    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(Self::CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> { self.tx.subscribe() }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Debug => event!("{message}"),
            LogLevel::Info => info!("{message}"),
            LogLevel::Warning => warn!("{message}"),
            LogLevel::Error => error!("{message}"),
        }
        let _ = self.tx.send(Notification::Log { level, message });
    }

    /// Reports a supervisor decision, tagged with the monitor that made it.
    pub fn intervention(&self, source: &str, message: impl AsRef<str>) {
        let message = format!("{source}: {}", message.as_ref());
        sv!("{message}");
        let _ = self.tx.send(Notification::Log { level: LogLevel::Warning, message });
    }

    pub fn status(&self, summary: StatusSummary) {
        let _ = self.tx.send(Notification::Status(Box::new(summary)));
    }
}
