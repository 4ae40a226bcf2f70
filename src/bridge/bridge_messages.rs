use crate::telemetry::{
    Battery, EkfStatus, GlobalPosition, GpsFix, GroundSpeed, Heartbeat, HwStatus,
    MissionProgress, NavOutput, ServoOutputs, TelemetryMsg,
};

/// Frame sent to the autopilot bridge.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BridgeRequest {
    /// Echoed in the matching [`Ack`].
    #[prost(uint32, tag = "1")]
    pub request_id: u32,
    #[prost(oneof = "RequestContent", tags = "2, 3, 4, 5, 6, 7, 8, 9, 10")]
    pub content: Option<RequestContent>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum RequestContent {
    #[prost(message, tag = "2")]
    SetMode(SetMode),
    #[prost(message, tag = "3")]
    Arm(Arm),
    #[prost(message, tag = "4")]
    Disarm(Disarm),
    #[prost(message, tag = "5")]
    SetActiveWaypoint(SetActiveWaypoint),
    #[prost(message, tag = "6")]
    UploadMission(UploadMission),
    #[prost(message, tag = "7")]
    ClearMission(ClearMission),
    #[prost(message, tag = "8")]
    OverrideChannel(OverrideChannel),
    #[prost(message, tag = "9")]
    ActuatorPower(ActuatorPower),
    #[prost(message, tag = "10")]
    ReadParameter(ReadParameter),
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SetMode {
    #[prost(uint32, tag = "1")]
    pub custom_mode: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Arm {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Disarm {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SetActiveWaypoint {
    #[prost(uint32, tag = "1")]
    pub seq: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadMission {
    /// Mission file the bridge loads, in waypoint file format.
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(uint32, tag = "2")]
    pub count: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ClearMission {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct OverrideChannel {
    #[prost(uint32, tag = "1")]
    pub channel: u32,
    #[prost(uint32, tag = "2")]
    pub pwm: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ActuatorPower {
    #[prost(bool, tag = "1")]
    pub on: bool,
}

/// Asks for one autopilot parameter by name, answered in [`Ack::value`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadParameter {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Frame received from the autopilot bridge.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BridgeEvent {
    #[prost(oneof = "EventContent", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11")]
    pub content: Option<EventContent>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum EventContent {
    #[prost(message, tag = "1")]
    Ack(Ack),
    #[prost(message, tag = "2")]
    Heartbeat(HeartbeatFrame),
    #[prost(message, tag = "3")]
    GlobalPositionInt(GlobalPositionInt),
    #[prost(message, tag = "4")]
    MissionCurrent(MissionCurrent),
    #[prost(message, tag = "5")]
    ServoOutputRaw(ServoOutputRaw),
    #[prost(message, tag = "6")]
    NavControllerOutput(NavControllerOutput),
    #[prost(message, tag = "7")]
    GpsRawInt(GpsRawInt),
    #[prost(message, tag = "8")]
    BatteryStatus(BatteryStatus),
    #[prost(message, tag = "9")]
    HwStatus(HwStatusFrame),
    #[prost(message, tag = "10")]
    VfrHud(VfrHud),
    #[prost(message, tag = "11")]
    EkfStatusReport(EkfStatusReport),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ack {
    #[prost(uint32, tag = "1")]
    pub request_id: u32,
    #[prost(bool, tag = "2")]
    pub success: bool,
    /// Number of mission items the autopilot took, only set for uploads.
    #[prost(uint32, tag = "3")]
    pub accepted: u32,
    #[prost(string, optional, tag = "4")]
    pub reason: Option<String>,
    /// Parameter value, only set for parameter reads.
    #[prost(float, optional, tag = "5")]
    pub value: Option<f32>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct HeartbeatFrame {
    #[prost(uint32, tag = "1")]
    pub custom_mode: u32,
    #[prost(uint32, tag = "2")]
    pub system_status: u32,
    #[prost(bool, tag = "3")]
    pub armed: bool,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GlobalPositionInt {
    /// Degrees times 1e7.
    #[prost(sint32, tag = "1")]
    pub lat: i32,
    /// Degrees times 1e7.
    #[prost(sint32, tag = "2")]
    pub lon: i32,
    /// Centidegrees.
    #[prost(uint32, tag = "3")]
    pub hdg: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct MissionCurrent {
    #[prost(uint32, tag = "1")]
    pub seq: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ServoOutputRaw {
    #[prost(uint32, tag = "1")]
    pub servo1_raw: u32,
    #[prost(uint32, tag = "2")]
    pub servo3_raw: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct NavControllerOutput {
    #[prost(float, tag = "1")]
    pub xtrack_error: f32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GpsRawInt {
    #[prost(uint32, tag = "1")]
    pub fix_type: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatteryStatus {
    /// Cell voltages in millivolts.
    #[prost(uint32, repeated, tag = "1")]
    pub voltages: Vec<u32>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct HwStatusFrame {
    /// Board voltage in millivolts.
    #[prost(uint32, tag = "1")]
    pub vcc: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct VfrHud {
    #[prost(float, tag = "1")]
    pub groundspeed: f32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct EkfStatusReport {
    #[prost(float, tag = "1")]
    pub compass_variance: f32,
}

impl EventContent {
    /// The telemetry sample carried by this frame; `None` for acks and
    /// frames without usable data.
    pub fn telemetry(&self) -> Option<TelemetryMsg> {
        Some(match self {
            EventContent::Ack(_) => return None,
            EventContent::Heartbeat(hb) => TelemetryMsg::Heartbeat(Heartbeat {
                custom_mode: hb.custom_mode,
                system_status: u8::try_from(hb.system_status).unwrap_or(u8::MAX),
                armed: hb.armed,
            }),
            EventContent::GlobalPositionInt(p) => TelemetryMsg::Position(GlobalPosition {
                lat: f64::from(p.lat) / 1e7,
                lng: f64::from(p.lon) / 1e7,
                heading_deg: f64::from(p.hdg) / 100.0,
            }),
            EventContent::MissionCurrent(m) => {
                TelemetryMsg::MissionProgress(MissionProgress { seq: u16::try_from(m.seq).ok()? })
            }
            EventContent::ServoOutputRaw(s) => TelemetryMsg::Servo(ServoOutputs {
                left: u16::try_from(s.servo1_raw).ok()?,
                right: u16::try_from(s.servo3_raw).ok()?,
            }),
            EventContent::NavControllerOutput(n) => {
                TelemetryMsg::Nav(NavOutput { xtrack_error: f64::from(n.xtrack_error) })
            }
            EventContent::GpsRawInt(g) => {
                TelemetryMsg::Gps(GpsFix { fix_type: u8::try_from(g.fix_type).ok()? })
            }
            EventContent::BatteryStatus(b) => {
                TelemetryMsg::Battery(Battery { voltage: f64::from(*b.voltages.first()?) / 1000.0 })
            }
            EventContent::HwStatus(h) => TelemetryMsg::Hw(HwStatus { vcc: f64::from(h.vcc) / 1000.0 }),
            EventContent::VfrHud(v) => {
                TelemetryMsg::Speed(GroundSpeed { groundspeed: f64::from(v.groundspeed) })
            }
            EventContent::EkfStatusReport(e) => {
                TelemetryMsg::Ekf(EkfStatus { compass_variance: f64::from(e.compass_variance) })
            }
        })
    }
}
