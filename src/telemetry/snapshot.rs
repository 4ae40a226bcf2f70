use super::DriveMode;
use crate::mission::Waypoint;
use tokio::{sync::RwLock, time::Instant};

/// A telemetry value together with the instant it was received.
#[derive(Debug, Clone, Copy)]
pub struct Stamped<T> {
    pub value: T,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heartbeat {
    pub custom_mode: u32,
    /// Zero while the autopilot has not finished booting.
    pub system_status: u8,
    pub armed: bool,
}

impl Heartbeat {
    pub fn mode(&self) -> Option<DriveMode> {
        if self.system_status == 0 { None } else { Some(DriveMode::from(self.custom_mode)) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalPosition {
    pub lat: f64,
    pub lng: f64,
    /// Heading in degrees, 0 is north.
    pub heading_deg: f64,
}

impl GlobalPosition {
    pub fn as_waypoint(&self) -> Waypoint { Waypoint::new(self.lat, self.lng) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionProgress {
    pub seq: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoOutputs {
    pub left: u16,
    pub right: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavOutput {
    pub xtrack_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsFix {
    pub fix_type: u8,
}

impl GpsFix {
    /// Fix type reported for an RTK float solution.
    pub const RTK_FLOAT: u8 = 5;

    pub fn is_rtk(&self) -> bool { self.fix_type >= Self::RTK_FLOAT }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battery {
    pub voltage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HwStatus {
    pub vcc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSpeed {
    pub groundspeed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EkfStatus {
    pub compass_variance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSample {
    pub x: f64,
    pub y: f64,
}

/// One incoming telemetry sample, replacing the cached value of its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryMsg {
    Heartbeat(Heartbeat),
    Position(GlobalPosition),
    MissionProgress(MissionProgress),
    Servo(ServoOutputs),
    Nav(NavOutput),
    Gps(GpsFix),
    Battery(Battery),
    Hw(HwStatus),
    Speed(GroundSpeed),
    Ekf(EkfStatus),
    Joystick(JoystickSample),
}

/// Last received value of every telemetry kind; `None` until the first sample arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryData {
    pub heartbeat: Option<Stamped<Heartbeat>>,
    pub position: Option<Stamped<GlobalPosition>>,
    pub progress: Option<Stamped<MissionProgress>>,
    pub servo: Option<Stamped<ServoOutputs>>,
    pub nav: Option<Stamped<NavOutput>>,
    pub gps: Option<Stamped<GpsFix>>,
    pub battery: Option<Stamped<Battery>>,
    pub hw: Option<Stamped<HwStatus>>,
    pub speed: Option<Stamped<GroundSpeed>>,
    pub ekf: Option<Stamped<EkfStatus>>,
    pub joystick: Option<Stamped<JoystickSample>>,
}

impl TelemetryData {
    pub fn mode(&self) -> Option<DriveMode> { self.heartbeat.and_then(|hb| hb.value.mode()) }
    pub fn position(&self) -> Option<GlobalPosition> { self.position.map(|p| p.value) }
    pub fn seq(&self) -> Option<u16> { self.progress.map(|p| p.value.seq) }
    pub fn servo(&self) -> Option<ServoOutputs> { self.servo.map(|s| s.value) }
    pub fn xtrack_error(&self) -> Option<f64> { self.nav.map(|n| n.value.xtrack_error) }
    pub fn fix(&self) -> Option<GpsFix> { self.gps.map(|g| g.value) }
    pub fn compass_variance(&self) -> Option<f64> {
        self.ekf.map(|e| e.value.compass_variance)
    }

    fn apply(&mut self, msg: TelemetryMsg, at: Instant) {
        match msg {
            TelemetryMsg::Heartbeat(value) => self.heartbeat = Some(Stamped { value, at }),
            TelemetryMsg::Position(value) => self.position = Some(Stamped { value, at }),
            TelemetryMsg::MissionProgress(value) => self.progress = Some(Stamped { value, at }),
            TelemetryMsg::Servo(value) => self.servo = Some(Stamped { value, at }),
            TelemetryMsg::Nav(value) => self.nav = Some(Stamped { value, at }),
            TelemetryMsg::Gps(value) => self.gps = Some(Stamped { value, at }),
            TelemetryMsg::Battery(value) => self.battery = Some(Stamped { value, at }),
            TelemetryMsg::Hw(value) => self.hw = Some(Stamped { value, at }),
            TelemetryMsg::Speed(value) => self.speed = Some(Stamped { value, at }),
            TelemetryMsg::Ekf(value) => self.ekf = Some(Stamped { value, at }),
            TelemetryMsg::Joystick(value) => self.joystick = Some(Stamped { value, at }),
        }
    }
}

/// Last-value cache of the autopilot telemetry.
///
/// The ingestion side is the only writer; every monitor and the pager take
/// cheap copies through [`TelemetrySnapshot::read`], so values of different
/// kinds may stem from slightly different points in time.
#[derive(Debug, Default)]
pub struct TelemetrySnapshot {
    data: RwLock<TelemetryData>,
}

impl TelemetrySnapshot {
    pub fn new() -> Self { Self::default() }

    /// Replaces the cached value of the message's kind.
    pub async fn update(&self, msg: TelemetryMsg) {
        self.data.write().await.apply(msg, Instant::now());
    }

    /// Returns a copy of all cached values.
    pub async fn read(&self) -> TelemetryData { *self.data.read().await }

    pub async fn mode(&self) -> Option<DriveMode> { self.data.read().await.mode() }

    pub async fn seq(&self) -> Option<u16> { self.data.read().await.seq() }
}
