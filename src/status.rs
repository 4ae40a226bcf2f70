use crate::event;
use crate::keychain::Keychain;
use crate::mission::WaypointDirection;
use crate::telemetry::{DriveMode, TelemetryData};
use std::time::Duration;
use tokio::sync::watch;

/// Periodic overview of the rover sent to the operator console.
///
/// Every value the rover has not reported yet is `-1`; the drive mode is
/// `None` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub lat: f64,
    pub lng: f64,
    pub heading: f64,
    /// Active sequence number of the loaded page.
    pub next_wp: i32,
    pub next_wp_lat: f64,
    pub next_wp_lng: f64,
    pub wp_dist: f64,
    pub servo_left: i32,
    pub servo_right: i32,
    pub xtrack: f64,
    pub mode: Option<DriveMode>,
    pub fix_type: i32,
    /// Battery voltage scaled by the robot's configured multiplier.
    pub battery_voltage: f64,
    pub hw_voltage: f64,
    pub speed: f64,
}

impl StatusSummary {
    const UNKNOWN: f64 = -1.0;

    /// Collects the current summary from the telemetry cache and the pager.
    pub async fn collect(k: &Keychain, battery_multiplier: f64) -> Self {
        let data = k.telemetry().read().await;
        let pager = k.pager();
        let next = pager.next_waypoint().await;
        let wp_dist = pager.distance_to_waypoint(WaypointDirection::Next).await;
        Self::from_parts(&data, next.map(|wp| (wp.lat, wp.lng)), wp_dist, battery_multiplier)
    }

    fn from_parts(
        data: &TelemetryData,
        next: Option<(f64, f64)>,
        wp_dist: f64,
        battery_multiplier: f64,
    ) -> Self {
        let position = data.position();
        let servo = data.servo();
        let (next_wp_lat, next_wp_lng) = next.unwrap_or((Self::UNKNOWN, Self::UNKNOWN));
        Self {
            lat: position.map_or(Self::UNKNOWN, |p| p.lat),
            lng: position.map_or(Self::UNKNOWN, |p| p.lng),
            heading: position.map_or(Self::UNKNOWN, |p| p.heading_deg),
            next_wp: data.seq().map_or(-1, i32::from),
            next_wp_lat,
            next_wp_lng,
            wp_dist,
            servo_left: servo.map_or(-1, |s| i32::from(s.left)),
            servo_right: servo.map_or(-1, |s| i32::from(s.right)),
            xtrack: data.xtrack_error().map_or(Self::UNKNOWN, |x| (x * 100.0).round() / 100.0),
            mode: data.mode(),
            fix_type: data.fix().map_or(-1, |f| i32::from(f.fix_type)),
            battery_voltage: data
                .battery
                .map_or(Self::UNKNOWN, |b| b.value.voltage * battery_multiplier),
            hw_voltage: data.hw.map_or(Self::UNKNOWN, |h| h.value.vcc),
            speed: data
                .speed
                .map_or(Self::UNKNOWN, |s| (s.value.groundspeed * 100.0).round() / 100.0),
        }
    }
}

/// Pushes a [`StatusSummary`] through the notifier once per [`Self::PERIOD`].
pub struct StatusPublisher {
    k: Keychain,
    battery_multiplier: watch::Receiver<f64>,
}

impl StatusPublisher {
    const PERIOD: Duration = Duration::from_secs(1);

    pub fn new(k: Keychain, battery_multiplier: watch::Receiver<f64>) -> Self {
        Self { k, battery_multiplier }
    }

    pub async fn run(self) {
        let shutdown = self.k.shutdown();
        let mut interval = tokio::time::interval(Self::PERIOD);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            let multiplier = *self.battery_multiplier.borrow();
            let summary = StatusSummary::collect(&self.k, multiplier).await;
            self.k.notifier().status(summary);
        }
        event!("Status publisher stopped");
    }
}
