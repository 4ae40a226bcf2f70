//! Last-value telemetry cache fed by the autopilot bridge.

mod drive_mode;
mod snapshot;
#[cfg(test)]
mod tests;

pub use drive_mode::DriveMode;
pub use snapshot::{
    Battery, EkfStatus, GlobalPosition, GpsFix, GroundSpeed, Heartbeat, HwStatus, JoystickSample,
    MissionProgress, NavOutput, ServoOutputs, Stamped, TelemetryData, TelemetryMsg,
    TelemetrySnapshot,
};
