use crate::keychain::Keychain;
use crate::mission::WaypointDirection;
use crate::supervisor::{Monitor, MonitorError};
use async_trait::async_trait;
use std::time::Duration;

/// Skips to the next waypoint once the rover is within `radius_m` of the
/// current one, for autopilots that do not honour their own waypoint radius.
#[derive(Debug)]
pub struct WaypointAdvanceMonitor {
    radius_m: f64,
}

impl WaypointAdvanceMonitor {
    const PERIOD: Duration = Duration::from_secs(1);

    pub fn new(radius_m: f64) -> Self { Self { radius_m } }
}

#[async_trait]
impl Monitor for WaypointAdvanceMonitor {
    fn name(&self) -> &'static str { "waypoint-advance" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let pager = k.pager();
        if !pager.view().await.in_progress() {
            return Ok(());
        }
        let Some(distance) = pager.try_distance_to_waypoint(WaypointDirection::Next).await else {
            return Ok(());
        };
        if distance < self.radius_m {
            let seq = pager.goto_next().await?;
            k.notifier().intervention(
                self.name(),
                format!("{distance:.2}m from the waypoint, advancing to {seq}"),
            );
        }
        Ok(())
    }
}
