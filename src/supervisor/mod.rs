mod arbiter;
mod breach_timer;
mod monitor;
pub mod monitors;
mod position_window;

pub use arbiter::{Arbiter, Intervention, InterventionOutcome};
pub use breach_timer::BreachTimer;
pub use monitor::{Monitor, MonitorError, run_monitor};
pub use position_window::PositionWindow;

use crate::config::Config;
use crate::info;
use crate::keychain::Keychain;
use monitors::{
    CompassMonitor, FixBabysitter, FullThrottleMonitor, GyrationMonitor, JoystickLivenessMonitor,
    MissionFinishedMonitor, NoProgressMonitor, OffCourseMonitor, StuckNearWaypointMonitor,
    WaypointAdvanceMonitor,
};
use tokio::task::JoinHandle;

/// Owns the set of anomaly monitors watching the rover.
pub struct Supervisor;

impl Supervisor {
    /// All monitors enabled by `config`.
    pub fn monitors(config: &Config) -> Vec<Box<dyn Monitor>> {
        let mut monitors: Vec<Box<dyn Monitor>> = vec![
            Box::new(CompassMonitor::default()),
            Box::new(OffCourseMonitor::default()),
            Box::new(GyrationMonitor::default()),
            Box::new(StuckNearWaypointMonitor::default()),
            Box::new(NoProgressMonitor::default()),
            Box::new(FullThrottleMonitor::default()),
            Box::new(MissionFinishedMonitor::default()),
            Box::new(FixBabysitter),
            Box::new(JoystickLivenessMonitor),
        ];
        if let Some(radius) = config.advance_radius_m {
            monitors.push(Box::new(WaypointAdvanceMonitor::new(radius)));
        }
        monitors
    }

    /// Spawns one task per monitor; each runs until the keychain's shutdown token fires.
    pub fn spawn_all(k: &Keychain) -> Vec<JoinHandle<()>> {
        let monitors = Self::monitors(&k.config());
        info!("Starting {} monitors", monitors.len());
        monitors.into_iter().map(|m| tokio::spawn(run_monitor(m, k.clone()))).collect()
    }
}
