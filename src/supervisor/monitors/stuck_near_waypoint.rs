use crate::keychain::Keychain;
use crate::mission::WaypointDirection;
use crate::supervisor::{BreachTimer, Monitor, MonitorError};
use crate::event;
use async_trait::async_trait;
use std::time::Duration;

/// Breaks the rover out of shuffling back and forth just short of a waypoint.
#[derive(Debug, Default)]
pub struct StuckNearWaypointMonitor {
    close: BreachTimer,
}

impl StuckNearWaypointMonitor {
    pub const RADIUS_M: f64 = 2.0;
    pub const MAX_DWELL: Duration = Duration::from_secs(10);
    pub const PAUSE: Duration = Duration::from_millis(1500);
    const PERIOD: Duration = Duration::from_secs(1);
}

#[async_trait]
impl Monitor for StuckNearWaypointMonitor {
    fn name(&self) -> &'static str { "stuck-near-waypoint" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let pager = k.pager();
        if !pager.view().await.in_progress() {
            self.close.reset();
            return Ok(());
        }
        let Some(distance) = pager.try_distance_to_waypoint(WaypointDirection::Next).await else {
            event!("No distance to waypoint, skipping");
            return Ok(());
        };
        if distance >= Self::RADIUS_M {
            self.close.reset();
            return Ok(());
        }
        let dwell = self.close.breached();
        if dwell > Self::MAX_DWELL {
            k.notifier().intervention(
                self.name(),
                format!(
                    "within {}m of the waypoint for {:.1}s, stopping and starting",
                    Self::RADIUS_M,
                    dwell.as_secs_f64()
                ),
            );
            k.arbiter().cycle(self.name(), Self::PAUSE).await;
            self.close.reset();
        }
        Ok(())
    }
}
