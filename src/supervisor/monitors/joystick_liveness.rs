use crate::keychain::Keychain;
use crate::supervisor::{Monitor, MonitorError};
use crate::telemetry::DriveMode;
use async_trait::async_trait;
use std::time::Duration;

/// Holds the rover when the operator joystick goes quiet while both drive
/// channels are still off trim.
#[derive(Debug, Default)]
pub struct JoystickLivenessMonitor;

impl JoystickLivenessMonitor {
    pub const TIMEOUT: Duration = Duration::from_secs(3);
    const PERIOD: Duration = Duration::from_secs(1);
}

#[async_trait]
impl Monitor for JoystickLivenessMonitor {
    fn name(&self) -> &'static str { "joystick-liveness" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        if !k.cmd().manual_via_joystick() {
            return Ok(());
        }
        let telemetry = k.telemetry().read().await;
        if telemetry.mode() != Some(DriveMode::Manual) {
            return Ok(());
        }
        let silent = telemetry.joystick.is_none_or(|j| j.at.elapsed() >= Self::TIMEOUT);
        let config = k.config();
        let moving = telemetry
            .servo()
            .is_some_and(|s| !config.servo_left.is_trim(s.left) && !config.servo_right.is_trim(s.right));
        if silent && moving {
            k.notifier().intervention(
                self.name(),
                format!("no joystick input for {}s, holding", Self::TIMEOUT.as_secs()),
            );
            k.arbiter().hold_keep_waypoint(self.name()).await;
        }
        Ok(())
    }
}
