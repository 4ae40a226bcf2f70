use crate::keychain::Keychain;
use crate::mission::WaypointDirection;
use crate::supervisor::{Monitor, MonitorError};
use crate::telemetry::DriveMode;
use crate::info;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Notices the rover reaching the last point of the loaded page and either
/// moves on to the next page or wraps up the mission.
#[derive(Debug, Default)]
pub struct MissionFinishedMonitor {
    /// Sequence the last page end was handled at; cleared once the rover
    /// leaves Auto or the sequence changes.
    handled: Option<u16>,
}

impl MissionFinishedMonitor {
    pub const ARRIVAL_RADIUS_M: f64 = 1.0;
    /// Lets the rover finish its natural deceleration.
    pub const SETTLE: Duration = Duration::from_secs(1);
    const PERIOD: Duration = Duration::from_secs(1);
}

#[async_trait]
impl Monitor for MissionFinishedMonitor {
    fn name(&self) -> &'static str { "mission-finished" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let pager = k.pager();
        let view = pager.view().await;
        let (Some(DriveMode::Auto), Some(seq), Some(last)) = (view.mode, view.seq, view.last_seq) else {
            self.handled = None;
            return Ok(());
        };
        if self.handled.is_some_and(|h| h != seq) {
            self.handled = None;
        }
        if self.handled.is_some() || seq != last || seq <= 1 {
            return Ok(());
        }
        let arrived = pager
            .try_distance_to_waypoint(WaypointDirection::Next)
            .await
            .is_some_and(|d| d < Self::ARRIVAL_RADIUS_M);
        if !arrived {
            return Ok(());
        }
        sleep(Self::SETTLE).await;
        self.handled = Some(seq);
        if view.has_next_page {
            info!("Reached the end of the loaded page, loading the next one");
            pager.continue_on_next_page(self.name()).await?;
        } else {
            pager.finish_mission(self.name()).await?;
        }
        Ok(())
    }
}
