use crate::mission::Waypoint;
use crate::telemetry::DriveMode;
use async_trait::async_trait;
use strum_macros::Display;

/// Errors surfaced while handing a command to the autopilot.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No autopilot link is currently established.
    LinkClosed,
    /// The link did not accept or acknowledge the command in time.
    Timeout,
    /// The autopilot side refused the command.
    Rejected(String),
}

impl std::error::Error for CommandError {}

impl From<tokio::time::error::Elapsed> for CommandError {
    fn from(_: tokio::time::error::Elapsed) -> Self { CommandError::Timeout }
}

/// Anything able to deliver drive commands to the autopilot.
///
/// Implementations do not need to serialize calls themselves, the
/// [`CommandChannel`](super::CommandChannel) does that for them.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn set_mode(&self, mode: DriveMode) -> Result<(), CommandError>;
    async fn arm(&self) -> Result<(), CommandError>;
    async fn disarm(&self) -> Result<(), CommandError>;
    /// Points the autopilot at sequence number `seq` of the resident mission.
    async fn set_active_waypoint(&self, seq: u16) -> Result<(), CommandError>;
    /// Uploads the given entries (home duplicate included) and returns how many
    /// the autopilot accepted.
    async fn upload_mission(&self, points: &[Waypoint]) -> Result<usize, CommandError>;
    async fn clear_mission(&self) -> Result<(), CommandError>;
    async fn override_drive_channel(&self, channel: u8, pwm: u16) -> Result<(), CommandError>;
    /// Switches the power relay of blades and wheels.
    async fn set_actuator_power(&self, on: bool) -> Result<(), CommandError>;
    /// Reads one autopilot parameter by name.
    async fn read_parameter(&self, name: &str) -> Result<f32, CommandError>;
}
