use crate::mission::{NavStep, Waypoint};
use crate::notifier::LogLevel;
use crate::status::StatusSummary;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Upstream {
    #[prost(oneof = "UpstreamContent", tags = "1, 2, 3, 4, 5")]
    pub content: Option<UpstreamContent>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ping {
    #[prost(string, optional, tag = "1")]
    pub echo: Option<String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Downstream {
    #[prost(oneof = "DownstreamContent", tags = "1, 2, 3, 4")]
    pub content: Option<DownstreamContent>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Pong {
    #[prost(string, optional, tag = "1")]
    pub echo: Option<String>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct MissionPoint {
    #[prost(double, tag = "1")]
    pub lat: f64,
    #[prost(double, tag = "2")]
    pub lng: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoadMission {
    #[prost(message, repeated, tag = "1")]
    pub waypoints: Vec<MissionPoint>,
}

impl LoadMission {
    pub(crate) fn into_waypoints(self) -> Vec<Waypoint> {
        self.waypoints.into_iter().map(|p| Waypoint::new(p.lat, p.lng)).collect()
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Navigate {
    #[prost(enumeration = "NavigateStep", tag = "1")]
    pub step: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Drive {
    #[prost(enumeration = "DriveCommand", tag = "1")]
    pub command: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Joystick {
    /// Steering axis in `[-1, 1]`.
    #[prost(double, tag = "1")]
    pub x: f64,
    /// Throttle axis in `[-1, 1]`.
    #[prost(double, tag = "2")]
    pub y: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(double, tag = "1")]
    pub lat: f64,
    #[prost(double, tag = "2")]
    pub lng: f64,
    #[prost(double, tag = "3")]
    pub heading: f64,
    #[prost(int32, tag = "4")]
    pub next_wp: i32,
    #[prost(double, tag = "5")]
    pub next_wp_lat: f64,
    #[prost(double, tag = "6")]
    pub next_wp_lng: f64,
    #[prost(double, tag = "7")]
    pub wp_dist: f64,
    #[prost(int32, tag = "8")]
    pub servo1: i32,
    #[prost(int32, tag = "9")]
    pub servo3: i32,
    #[prost(double, tag = "10")]
    pub xtrack: f64,
    #[prost(string, optional, tag = "11")]
    pub mode: Option<String>,
    #[prost(int32, tag = "12")]
    pub fix_type: i32,
    #[prost(double, tag = "13")]
    pub battery_voltage: f64,
    #[prost(double, tag = "14")]
    pub hw_voltage: f64,
    #[prost(double, tag = "15")]
    pub speed: f64,
}

impl Status {
    pub(crate) fn from_summary(s: &StatusSummary) -> Self {
        Self {
            lat: s.lat,
            lng: s.lng,
            heading: s.heading,
            next_wp: s.next_wp,
            next_wp_lat: s.next_wp_lat,
            next_wp_lng: s.next_wp_lng,
            wp_dist: s.wp_dist,
            servo1: s.servo_left,
            servo3: s.servo_right,
            xtrack: s.xtrack,
            mode: s.mode.map(|m| m.to_string()),
            fix_type: s.fix_type,
            battery_voltage: s.battery_voltage,
            hw_voltage: s.hw_voltage,
            speed: s.speed,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LogLine {
    #[prost(enumeration = "LogSeverity", tag = "1")]
    pub level: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

impl LogLine {
    pub(crate) fn new(level: LogLevel, message: String) -> Self {
        let level = match level {
            LogLevel::Debug => LogSeverity::Debug,
            LogLevel::Info => LogSeverity::Info,
            LogLevel::Warning => LogSeverity::Warning,
            LogLevel::Error => LogSeverity::Error,
        };
        Self { level: level as i32, message }
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct LoadMissionReply {
    #[prost(bool, tag = "1")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum DownstreamContent {
    #[prost(message, tag = "1")]
    Pong(Pong),
    #[prost(message, tag = "2")]
    Status(Status),
    #[prost(message, tag = "3")]
    LogLine(LogLine),
    #[prost(message, tag = "4")]
    LoadMissionReply(LoadMissionReply),
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum UpstreamContent {
    #[prost(message, tag = "1")]
    Ping(Ping),
    #[prost(message, tag = "2")]
    LoadMission(LoadMission),
    #[prost(message, tag = "3")]
    Navigate(Navigate),
    #[prost(message, tag = "4")]
    Drive(Drive),
    #[prost(message, tag = "5")]
    Joystick(Joystick),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum NavigateStep {
    Next = 0,
    Previous = 1,
    Plus50 = 2,
    Minus50 = 3,
}

impl From<NavigateStep> for NavStep {
    fn from(value: NavigateStep) -> Self {
        match value {
            NavigateStep::Next => NavStep::Next,
            NavigateStep::Previous => NavStep::Previous,
            NavigateStep::Plus50 => NavStep::Plus50,
            NavigateStep::Minus50 => NavStep::Minus50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum DriveCommand {
    Stop = 0,
    Start = 1,
    Manual = 2,
    Hold = 3,
    HoldKeepWaypoint = 4,
    /// Switches the blade and wheel power relay back on after a stop.
    PowerOn = 5,
    PowerOff = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LogSeverity {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}
