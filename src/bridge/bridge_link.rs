use super::bridge_messages::{
    Ack, ActuatorPower, Arm, BridgeEvent, BridgeRequest, ClearMission, Disarm, EventContent,
    OverrideChannel, ReadParameter, RequestContent, SetActiveWaypoint, SetMode, UploadMission,
};
use crate::command::{CommandError, CommandSink};
use crate::mission::{Waypoint, mission_file};
use crate::telemetry::{DriveMode, TelemetrySnapshot};
use crate::{event, info, warn};
use async_trait::async_trait;
use prost::Message;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use strum_macros::Display;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, oneshot};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display)]
pub enum LinkError {
    Io(std::io::Error),
    Decode(prost::DecodeError),
    FrameTooLarge(u32),
}

impl std::error::Error for LinkError {}

impl From<std::io::Error> for LinkError {
    fn from(value: std::io::Error) -> Self { LinkError::Io(value) }
}

impl From<prost::DecodeError> for LinkError {
    fn from(value: prost::DecodeError) -> Self { LinkError::Decode(value) }
}

type PendingAcks = std::sync::Mutex<HashMap<u32, oneshot::Sender<Ack>>>;

/// Removes a request's ack slot once its caller stops waiting.
struct PendingGuard<'a> {
    pending: &'a PendingAcks,
    request_id: u32,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.request_id);
    }
}

/// TCP link to the autopilot bridge.
///
/// Telemetry frames coming from the bridge are fed into the
/// [`TelemetrySnapshot`]; commands are sent as [`BridgeRequest`]s and resolved
/// by the bridge's [`Ack`]. The connection is re-established until shutdown,
/// commands issued while it is down fail with [`CommandError::LinkClosed`].
pub struct BridgeLink {
    addr: String,
    mission_dir: PathBuf,
    writer: Mutex<Option<OwnedWriteHalf>>,
    pending: PendingAcks,
    next_id: AtomicU32,
}

impl BridgeLink {
    const RECONNECT_DELAY: Duration = Duration::from_secs(2);
    const MAX_FRAME_LEN: u32 = 1024 * 1024;

    pub fn new(addr: impl Into<String>, mission_dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            addr: addr.into(),
            mission_dir: mission_dir.into(),
            writer: Mutex::new(None),
            pending: std::sync::Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        })
    }

    /// Keeps the link up and ingests telemetry until `shutdown` fires.
    pub async fn run(self: Arc<Self>, telemetry: Arc<TelemetrySnapshot>, shutdown: CancellationToken) {
        loop {
            let stream = tokio::select! {
                () = shutdown.cancelled() => break,
                stream = TcpStream::connect(&self.addr) => stream,
            };
            match stream {
                Ok(stream) => {
                    info!("Connected to autopilot bridge at {}", self.addr);
                    let (mut rx, tx) = stream.into_split();
                    *self.writer.lock().await = Some(tx);
                    let res = tokio::select! {
                        () = shutdown.cancelled() => Ok(()),
                        res = self.ingest(&mut rx, &telemetry) => res,
                    };
                    *self.writer.lock().await = None;
                    self.fail_pending();
                    if let Err(e) = res {
                        warn!("Lost autopilot bridge: {e}");
                    }
                }
                Err(e) => event!("Autopilot bridge at {} unreachable: {e}", self.addr),
            }
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = sleep(Self::RECONNECT_DELAY) => {}
            }
        }
        event!("Bridge link stopped");
    }

    async fn ingest(
        &self,
        rx: &mut OwnedReadHalf,
        telemetry: &TelemetrySnapshot,
    ) -> Result<(), LinkError> {
        loop {
            let content = match Self::read_frame(rx).await {
                Ok(BridgeEvent { content: Some(content) }) => content,
                Ok(_) => continue,
                Err(LinkError::Decode(e)) => {
                    warn!("Dropping undecodable bridge frame: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let EventContent::Ack(ack) = content {
                let slot =
                    self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&ack.request_id);
                if let Some(slot) = slot {
                    let _ = slot.send(ack);
                }
            } else if let Some(msg) = content.telemetry() {
                telemetry.update(msg).await;
            }
        }
    }

    async fn read_frame(rx: &mut OwnedReadHalf) -> Result<BridgeEvent, LinkError> {
        let length = rx.read_u32().await?;
        if length > Self::MAX_FRAME_LEN {
            return Err(LinkError::FrameTooLarge(length));
        }
        let mut buffer = vec![0u8; length as usize];
        rx.read_exact(&mut buffer).await?;
        Ok(BridgeEvent::decode(buffer.as_slice())?)
    }

    /// Wakes every caller still waiting for an ack with `LinkClosed`.
    fn fail_pending(&self) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn request(&self, content: RequestContent) -> Result<Ack, CommandError> {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).insert(request_id, tx);
        let _guard = PendingGuard { pending: &self.pending, request_id };

        let frame = BridgeRequest { request_id, content: Some(content) }.encode_to_vec();
        {
            let mut writer = self.writer.lock().await;
            let Some(socket) = writer.as_mut() else {
                return Err(CommandError::LinkClosed);
            };
            let sent = async {
                socket.write_u32(frame.len() as u32).await?;
                socket.write_all(&frame).await
            };
            if let Err(e) = sent.await {
                warn!("Failed to write to autopilot bridge: {e}");
                *writer = None;
                return Err(CommandError::LinkClosed);
            }
        }

        let ack = rx.await.map_err(|_| CommandError::LinkClosed)?;
        if ack.success {
            Ok(ack)
        } else {
            Err(CommandError::Rejected(ack.reason.unwrap_or_default()))
        }
    }
}

#[async_trait]
impl CommandSink for BridgeLink {
    async fn set_mode(&self, mode: DriveMode) -> Result<(), CommandError> {
        let custom_mode = mode.custom_mode();
        self.request(RequestContent::SetMode(SetMode { custom_mode })).await.map(drop)
    }

    async fn arm(&self) -> Result<(), CommandError> {
        self.request(RequestContent::Arm(Arm {})).await.map(drop)
    }

    async fn disarm(&self) -> Result<(), CommandError> {
        self.request(RequestContent::Disarm(Disarm {})).await.map(drop)
    }

    async fn set_active_waypoint(&self, seq: u16) -> Result<(), CommandError> {
        let seq = u32::from(seq);
        self.request(RequestContent::SetActiveWaypoint(SetActiveWaypoint { seq })).await.map(drop)
    }

    async fn upload_mission(&self, points: &[Waypoint]) -> Result<usize, CommandError> {
        let contents = mission_file::render(points);
        let path = mission_file::write_to_dir(&self.mission_dir, &contents)
            .await
            .map_err(|e| CommandError::Rejected(format!("writing mission file: {e}")))?;
        let upload = UploadMission {
            path: path.to_string_lossy().into_owned(),
            count: u32::try_from(points.len()).unwrap_or(u32::MAX),
        };
        let ack = self.request(RequestContent::UploadMission(upload)).await?;
        Ok(usize::try_from(ack.accepted).unwrap_or(usize::MAX))
    }

    async fn clear_mission(&self) -> Result<(), CommandError> {
        self.request(RequestContent::ClearMission(ClearMission {})).await.map(drop)
    }

    async fn override_drive_channel(&self, channel: u8, pwm: u16) -> Result<(), CommandError> {
        let frame = OverrideChannel { channel: u32::from(channel), pwm: u32::from(pwm) };
        self.request(RequestContent::OverrideChannel(frame)).await.map(drop)
    }

    async fn set_actuator_power(&self, on: bool) -> Result<(), CommandError> {
        self.request(RequestContent::ActuatorPower(ActuatorPower { on })).await.map(drop)
    }

    async fn read_parameter(&self, name: &str) -> Result<f32, CommandError> {
        let read = ReadParameter { name: name.to_owned() };
        let ack = self.request(RequestContent::ReadParameter(read)).await?;
        ack.value.ok_or_else(|| CommandError::Rejected(format!("no value for {name}")))
    }
}
