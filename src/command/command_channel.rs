use super::{CommandError, CommandSink};
use crate::mission::Waypoint;
use crate::telemetry::DriveMode;
use crate::event;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{sync::Mutex, time::{sleep, timeout}};

/// The single path through which commands reach the autopilot.
///
/// Every call takes the channel lock for exactly one command, so sequences
/// issued from different tasks interleave command by command but never
/// overlap on the wire. The lock is never held across a pause.
pub struct CommandChannel {
    sink: Arc<dyn CommandSink>,
    lock: Mutex<()>,
    /// Set when manual mode was entered from the operator joystick.
    manual_via_joystick: AtomicBool,
}

impl CommandChannel {
    /// Timeout for a single command hand-off.
    const SEND_TIMEOUT: Duration = Duration::from_secs(2);
    /// Timeout for a complete mission upload.
    const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
    /// Delay before a reliability-critical command is sent a second time.
    pub const RESEND_DELAY: Duration = Duration::from_millis(100);

    pub fn new(sink: Arc<dyn CommandSink>) -> Self {
        Self { sink, lock: Mutex::new(()), manual_via_joystick: AtomicBool::new(false) }
    }

    pub fn manual_via_joystick(&self) -> bool { self.manual_via_joystick.load(Ordering::Relaxed) }

    pub async fn set_mode(&self, mode: DriveMode) -> Result<(), CommandError> {
        self.manual_via_joystick.store(mode == DriveMode::Manual, Ordering::Relaxed);
        let _guard = self.lock.lock().await;
        event!("Setting drive mode {mode}");
        timeout(Self::SEND_TIMEOUT, self.sink.set_mode(mode)).await?
    }

    pub async fn arm(&self) -> Result<(), CommandError> {
        let _guard = self.lock.lock().await;
        timeout(Self::SEND_TIMEOUT, self.sink.arm()).await?
    }

    pub async fn disarm(&self) -> Result<(), CommandError> {
        let _guard = self.lock.lock().await;
        timeout(Self::SEND_TIMEOUT, self.sink.disarm()).await?
    }

    pub async fn set_active_waypoint(&self, seq: u16) -> Result<(), CommandError> {
        let _guard = self.lock.lock().await;
        event!("Setting active waypoint {seq}");
        timeout(Self::SEND_TIMEOUT, self.sink.set_active_waypoint(seq)).await?
    }

    /// Clears the resident mission and uploads `points` in its place.
    pub async fn upload_mission(&self, points: &[Waypoint]) -> Result<usize, CommandError> {
        let _guard = self.lock.lock().await;
        timeout(Self::SEND_TIMEOUT, self.sink.clear_mission()).await??;
        if points.is_empty() {
            return Ok(0);
        }
        timeout(Self::UPLOAD_TIMEOUT, self.sink.upload_mission(points)).await?
    }

    pub async fn override_drive_channel(&self, channel: u8, pwm: u16) -> Result<(), CommandError> {
        let _guard = self.lock.lock().await;
        timeout(Self::SEND_TIMEOUT, self.sink.override_drive_channel(channel, pwm)).await?
    }

    pub async fn set_actuator_power(&self, on: bool) -> Result<(), CommandError> {
        let _guard = self.lock.lock().await;
        event!("Switching actuator power {}", if on { "on" } else { "off" });
        timeout(Self::SEND_TIMEOUT, self.sink.set_actuator_power(on)).await?
    }

    pub async fn read_parameter(&self, name: &str) -> Result<f32, CommandError> {
        let _guard = self.lock.lock().await;
        timeout(Self::SEND_TIMEOUT, self.sink.read_parameter(name)).await?
    }

    /// Disarms and enters Hold, repeating the mode command once in case the
    /// first one was dropped.
    pub async fn hold(&self) -> Result<(), CommandError> {
        self.disarm().await?;
        self.set_mode(DriveMode::Hold).await?;
        sleep(Self::RESEND_DELAY).await;
        self.set_mode(DriveMode::Hold).await
    }

    /// Enters Auto and arms, sending both a second time.
    pub async fn start(&self) -> Result<(), CommandError> {
        self.disarm().await?;
        self.set_mode(DriveMode::Auto).await?;
        self.arm().await?;
        sleep(Self::RESEND_DELAY).await;
        self.set_mode(DriveMode::Auto).await?;
        self.arm().await
    }

    /// Centres both drive channels, arms and enters Manual for joystick driving.
    pub async fn enter_manual(&self, left_trim: u16, right_trim: u16) -> Result<(), CommandError> {
        self.override_drive_channel(1, left_trim).await?;
        self.override_drive_channel(3, right_trim).await?;
        self.arm().await?;
        self.set_mode(DriveMode::Manual).await?;
        sleep(Self::RESEND_DELAY).await;
        self.set_mode(DriveMode::Manual).await
    }
}
