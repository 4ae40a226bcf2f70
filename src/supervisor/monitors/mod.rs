mod compass;
mod fix_babysitter;
mod full_throttle;
mod gyration;
mod joystick_liveness;
mod mission_finished;
mod no_progress;
mod off_course;
mod stuck_near_waypoint;
mod waypoint_advance;

pub use compass::CompassMonitor;
pub use fix_babysitter::FixBabysitter;
pub use full_throttle::FullThrottleMonitor;
pub use gyration::GyrationMonitor;
#[cfg(test)]
pub use gyration::wobble;
pub use joystick_liveness::JoystickLivenessMonitor;
pub use mission_finished::MissionFinishedMonitor;
pub use no_progress::NoProgressMonitor;
pub use off_course::OffCourseMonitor;
pub use stuck_near_waypoint::StuckNearWaypointMonitor;
pub use waypoint_advance::WaypointAdvanceMonitor;
