use crate::keychain::Keychain;
use crate::notifier::LogLevel;
use crate::supervisor::{BreachTimer, Monitor, MonitorError, PositionWindow};
use crate::telemetry::DriveMode;
use async_trait::async_trait;
use std::time::Duration;

/// Holds the rover when a drive output is pinned at its limit but the rover
/// does not move. Treated as a hard fault, so there is no automatic restart.
#[derive(Debug, Default)]
pub struct FullThrottleMonitor {
    positions: PositionWindow,
    pinned: BreachTimer,
}

impl FullThrottleMonitor {
    pub const MIN_TRAVEL_M: f64 = 0.5;
    pub const MAX_PINNED: Duration = Duration::from_secs(10);
    pub const PERIOD: Duration = Duration::from_secs(2);
}

#[async_trait]
impl Monitor for FullThrottleMonitor {
    fn name(&self) -> &'static str { "full-throttle" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let view = k.pager().view().await;
        if view.mode != Some(DriveMode::Auto) {
            self.positions.clear();
            self.pinned.reset();
            return Ok(());
        }
        let telemetry = k.telemetry().read().await;
        if let Some(position) = telemetry.position() {
            self.positions.push(position.as_waypoint());
        }
        if !view.in_progress() {
            self.pinned.reset();
            return Ok(());
        }
        let config = k.config();
        let at_limit = telemetry.servo().is_some_and(|s| {
            config.servo_left.is_extreme(s.left) || config.servo_right.is_extreme(s.right)
        });
        if !at_limit {
            self.pinned.reset();
            return Ok(());
        }
        if !self.pinned.is_running() {
            k.notifier().log(LogLevel::Info, "Full throttle in Auto mode");
        }
        let pinned = self.pinned.breached();
        if pinned <= Self::MAX_PINNED {
            return Ok(());
        }
        let Some(travelled) = self.positions.travelled().filter(|t| *t < Self::MIN_TRAVEL_M) else {
            return Ok(());
        };
        k.notifier().intervention(
            self.name(),
            format!(
                "full throttle for {:.1}s but travelled only {travelled:.2}m, holding",
                pinned.as_secs_f64()
            ),
        );
        k.arbiter().hold_keep_waypoint(self.name()).await;
        self.pinned.reset();
        self.positions.clear();
        Ok(())
    }
}
