use super::{CommandError, CommandSink};
use crate::mission::Waypoint;
use crate::telemetry::DriveMode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// A command as it was handed to the [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Mode(DriveMode),
    Arm,
    Disarm,
    Waypoint(u16),
    Upload(Vec<Waypoint>),
    Clear,
    Override(u8, u16),
    Power(bool),
    Param(String),
}

/// Command sink recording everything it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Sent>>,
    reject_uploads: AtomicBool,
    params: Mutex<HashMap<String, f32>>,
    /// Parameter reads still to fail with [`CommandError::LinkClosed`].
    link_down_reads: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn sent(&self) -> Vec<Sent> { self.sent.lock().unwrap().clone() }

    pub fn clear(&self) { self.sent.lock().unwrap().clear() }

    /// Makes every following upload report zero accepted waypoints.
    pub fn reject_uploads(&self) { self.reject_uploads.store(true, Ordering::Relaxed) }

    pub fn set_param(&self, name: &str, value: f32) {
        self.params.lock().unwrap().insert(name.to_owned(), value);
    }

    /// Makes the next `n` parameter reads fail as if the link was down.
    pub fn fail_param_reads(&self, n: usize) { self.link_down_reads.store(n, Ordering::Relaxed) }

    pub fn uploads(&self) -> Vec<Vec<Waypoint>> {
        self.sent()
            .into_iter()
            .filter_map(|s| if let Sent::Upload(p) = s { Some(p) } else { None })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Sent) -> bool) -> usize {
        self.sent().iter().filter(|s| pred(s)).count()
    }

    fn push(&self, s: Sent) { self.sent.lock().unwrap().push(s) }
}

#[async_trait]
impl CommandSink for RecordingSink {
    async fn set_mode(&self, mode: DriveMode) -> Result<(), CommandError> {
        self.push(Sent::Mode(mode));
        Ok(())
    }

    async fn arm(&self) -> Result<(), CommandError> {
        self.push(Sent::Arm);
        Ok(())
    }

    async fn disarm(&self) -> Result<(), CommandError> {
        self.push(Sent::Disarm);
        Ok(())
    }

    async fn set_active_waypoint(&self, seq: u16) -> Result<(), CommandError> {
        self.push(Sent::Waypoint(seq));
        Ok(())
    }

    async fn upload_mission(&self, points: &[Waypoint]) -> Result<usize, CommandError> {
        self.push(Sent::Upload(points.to_vec()));
        if self.reject_uploads.load(Ordering::Relaxed) { Ok(0) } else { Ok(points.len()) }
    }

    async fn clear_mission(&self) -> Result<(), CommandError> {
        self.push(Sent::Clear);
        Ok(())
    }

    async fn override_drive_channel(&self, channel: u8, pwm: u16) -> Result<(), CommandError> {
        self.push(Sent::Override(channel, pwm));
        Ok(())
    }

    async fn set_actuator_power(&self, on: bool) -> Result<(), CommandError> {
        self.push(Sent::Power(on));
        Ok(())
    }

    async fn read_parameter(&self, name: &str) -> Result<f32, CommandError> {
        self.push(Sent::Param(name.to_owned()));
        let down = self.link_down_reads.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        if down.is_ok() {
            return Err(CommandError::LinkClosed);
        }
        let value = self.params.lock().unwrap().get(name).copied();
        value.ok_or_else(|| CommandError::Rejected(format!("unknown parameter {name}")))
    }
}
