use crate::keychain::Keychain;
use crate::supervisor::{Monitor, MonitorError, PositionWindow};
use crate::telemetry::DriveMode;
use async_trait::async_trait;
use std::time::Duration;

/// Restarts the rover when it sits still in Auto for no apparent reason.
#[derive(Debug, Default)]
pub struct NoProgressMonitor {
    positions: PositionWindow,
}

impl NoProgressMonitor {
    /// Least distance expected over a full position window.
    pub const MIN_TRAVEL_M: f64 = 0.5;
    pub const PAUSE: Duration = Duration::from_millis(1500);
    /// Also the spacing of the position samples.
    pub const PERIOD: Duration = Duration::from_secs(2);
}

#[async_trait]
impl Monitor for NoProgressMonitor {
    fn name(&self) -> &'static str { "no-progress" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let view = k.pager().view().await;
        if view.mode != Some(DriveMode::Auto) {
            self.positions.clear();
            return Ok(());
        }
        if let Some(position) = k.telemetry().read().await.position() {
            self.positions.push(position.as_waypoint());
        }
        if !view.in_progress() {
            return Ok(());
        }
        let Some(travelled) = self.positions.travelled().filter(|t| *t < Self::MIN_TRAVEL_M) else {
            return Ok(());
        };
        k.notifier().intervention(
            self.name(),
            format!(
                "travelled {travelled:.2}m over the last {} samples, stopping and starting",
                PositionWindow::DEFAULT_CAPACITY
            ),
        );
        k.arbiter().cycle(self.name(), Self::PAUSE).await;
        self.positions.clear();
        Ok(())
    }
}
