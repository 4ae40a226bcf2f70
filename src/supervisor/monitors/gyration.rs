use crate::keychain::Keychain;
use crate::mission::WaypointDirection;
use crate::notifier::LogLevel;
use crate::supervisor::{Monitor, MonitorError};
use async_trait::async_trait;
use itertools::Itertools;
use std::{collections::VecDeque, time::Duration};

/// Stops and restarts the rover when its heading keeps swinging back and forth.
///
/// Headings sampled within [`GyrationMonitor::TURN_RADIUS_M`] of either
/// neighbouring waypoint belong to a planned turn and reset the window.
#[derive(Debug, Default)]
pub struct GyrationMonitor {
    /// Newest first.
    headings: VecDeque<f64>,
}

impl GyrationMonitor {
    pub const WINDOW: usize = 5;
    pub const TURN_RADIUS_M: f64 = 10.0;
    pub const MAX_WOBBLE_DEG: f64 = 15.0;
    pub const COOLDOWN: Duration = Duration::from_secs(45);
    pub const PAUSE: Duration = Duration::from_secs(5);
    const PERIOD: Duration = Duration::from_secs(1);
}

/// Smallest angle between two headings in degrees.
pub fn heading_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Largest pairwise difference within `headings`.
pub fn wobble<'a, I>(headings: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
    I::IntoIter: Clone,
{
    headings
        .into_iter()
        .tuple_combinations()
        .map(|(a, b)| heading_difference(*a, *b))
        .fold(0.0, f64::max)
}

#[async_trait]
impl Monitor for GyrationMonitor {
    fn name(&self) -> &'static str { "gyration" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let pager = k.pager();
        if !pager.view().await.in_progress() {
            return Ok(());
        }
        let Some(position) = k.telemetry().read().await.position() else {
            return Ok(());
        };
        let prev = pager.try_distance_to_waypoint(WaypointDirection::Previous).await;
        let next = pager.try_distance_to_waypoint(WaypointDirection::Next).await;
        let turning = [prev, next].iter().any(|d| d.is_none_or(|d| d < Self::TURN_RADIUS_M));
        if turning {
            if !self.headings.is_empty() {
                k.notifier().log(
                    LogLevel::Debug,
                    format!("Within {}m of a waypoint, resetting headings", Self::TURN_RADIUS_M),
                );
            }
            self.headings.clear();
            return Ok(());
        }

        self.headings.push_front(position.heading_deg);
        self.headings.truncate(Self::WINDOW);
        if self.headings.len() < 2 {
            return Ok(());
        }
        let wobble = wobble(&self.headings);
        if wobble <= Self::MAX_WOBBLE_DEG {
            return Ok(());
        }
        let arbiter = k.arbiter();
        if arbiter.cooldown_elapsed(Self::COOLDOWN) {
            self.headings.clear();
            k.notifier().intervention(
                self.name(),
                format!("{wobble:.1} degree wobble, stopping and starting"),
            );
            arbiter.cycle(self.name(), Self::PAUSE).await;
        } else {
            k.notifier().log(
                LogLevel::Info,
                format!(
                    "{wobble:.1} degree wobble, last intervention less than {}s ago, skipping",
                    Self::COOLDOWN.as_secs()
                ),
            );
        }
        Ok(())
    }
}
