use super::BridgeLink;
use super::bridge_messages::{
    Ack, BridgeEvent, BridgeRequest, EventContent, GlobalPositionInt, HeartbeatFrame,
    MissionCurrent, RequestContent,
};
use crate::command::{CommandError, CommandSink};
use crate::mission::{Waypoint, mission_file};
use crate::telemetry::{DriveMode, TelemetrySnapshot};
use prost::Message;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

async fn send_event(socket: &mut TcpStream, content: EventContent) {
    let frame = BridgeEvent { content: Some(content) }.encode_to_vec();
    socket.write_u32(u32::try_from(frame.len()).unwrap()).await.unwrap();
    socket.write_all(&frame).await.unwrap();
}

async fn read_request(socket: &mut TcpStream) -> BridgeRequest {
    let len = socket.read_u32().await.unwrap();
    let mut buf = vec![0u8; len as usize];
    socket.read_exact(&mut buf).await.unwrap();
    BridgeRequest::decode(buf.as_slice()).unwrap()
}

/// Starts a link against a fresh listener and returns the accepted bridge side.
async fn connected_link() -> (Arc<BridgeLink>, Arc<TelemetrySnapshot>, TcpStream, CancellationToken)
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let dir = std::env::temp_dir().join(format!("rover-missions-{}", rand::rng().random::<u64>()));
    let link = BridgeLink::new(addr, dir);
    let telemetry = Arc::new(TelemetrySnapshot::new());
    let shutdown = CancellationToken::new();
    tokio::spawn(Arc::clone(&link).run(Arc::clone(&telemetry), shutdown.clone()));
    let (mut socket, _) = listener.accept().await.unwrap();
    // the writer is registered before the first frame is read
    send_event(&mut socket, EventContent::MissionCurrent(MissionCurrent { seq: 0 })).await;
    while telemetry.seq().await.is_none() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    (link, telemetry, socket, shutdown)
}

#[tokio::test]
async fn test_command_without_link_fails() {
    let link = BridgeLink::new("127.0.0.1:1", std::env::temp_dir());
    assert_eq!(link.arm().await, Err(CommandError::LinkClosed));
}

#[tokio::test]
async fn test_telemetry_frames_reach_snapshot() {
    let (_link, telemetry, mut bridge, shutdown) = connected_link().await;
    send_event(&mut bridge, EventContent::Heartbeat(HeartbeatFrame {
        custom_mode: 10,
        system_status: 4,
        armed: true,
    }))
    .await;
    send_event(&mut bridge, EventContent::GlobalPositionInt(GlobalPositionInt {
        lat: 305_000_000,
        lon: -876_000_000,
        hdg: 9_050,
    }))
    .await;
    send_event(&mut bridge, EventContent::MissionCurrent(MissionCurrent { seq: 7 })).await;

    while telemetry.seq().await != Some(7) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let data = telemetry.read().await;
    assert_eq!(data.mode(), Some(DriveMode::Auto));
    assert_eq!(data.seq(), Some(7));
    let pos = data.position().unwrap();
    assert!((pos.lat - 30.5).abs() < 1e-9);
    assert!((pos.heading_deg - 90.5).abs() < 1e-9);
    shutdown.cancel();
}

#[tokio::test]
async fn test_set_mode_waits_for_ack() {
    let (link, _telemetry, mut bridge, shutdown) = connected_link().await;
    let bridge_side = tokio::spawn(async move {
        let req = read_request(&mut bridge).await;
        assert!(matches!(req.content, Some(RequestContent::SetMode(m)) if m.custom_mode == 4));
        let ack = Ack { request_id: req.request_id, success: true, accepted: 0, reason: None, value: None };
        send_event(&mut bridge, EventContent::Ack(ack)).await;
        let req = read_request(&mut bridge).await;
        let ack = Ack {
            request_id: req.request_id,
            success: false,
            accepted: 0,
            reason: Some(String::from("not armable")),
            value: None,
        };
        send_event(&mut bridge, EventContent::Ack(ack)).await;
        bridge
    });
    link.set_mode(DriveMode::Hold).await.unwrap();
    assert_eq!(link.arm().await, Err(CommandError::Rejected(String::from("not armable"))));
    let _bridge = bridge_side.await.unwrap();
    shutdown.cancel();
}

#[tokio::test]
async fn test_upload_writes_mission_file() {
    let (link, _telemetry, mut bridge, shutdown) = connected_link().await;
    let points = vec![Waypoint::new(30.0, -87.0), Waypoint::new(30.0, -87.0), Waypoint::new(30.5, -87.5)];
    let expected = mission_file::render(&points);
    let bridge_side = tokio::spawn(async move {
        let req = read_request(&mut bridge).await;
        let Some(RequestContent::UploadMission(upload)) = req.content else {
            panic!("expected an upload, got {:?}", req.content);
        };
        let contents = tokio::fs::read_to_string(&upload.path).await.unwrap();
        let ack = Ack { request_id: req.request_id, success: true, accepted: upload.count, reason: None, value: None };
        send_event(&mut bridge, EventContent::Ack(ack)).await;
        (contents, bridge)
    });
    let accepted = link.upload_mission(&points).await.unwrap();
    let (contents, _bridge) = bridge_side.await.unwrap();
    assert_eq!(accepted, 3);
    assert_eq!(contents, expected);
    shutdown.cancel();
}

#[tokio::test]
async fn test_pending_command_fails_when_bridge_drops() {
    let (link, _telemetry, mut bridge, shutdown) = connected_link().await;
    let bridge_side = tokio::spawn(async move {
        read_request(&mut bridge).await;
        drop(bridge);
    });
    assert_eq!(link.disarm().await, Err(CommandError::LinkClosed));
    bridge_side.await.unwrap();
    shutdown.cancel();
}

#[tokio::test]
async fn test_read_parameter_returns_ack_value() {
    let (link, _telemetry, mut bridge, shutdown) = connected_link().await;
    let bridge_side = tokio::spawn(async move {
        let req = read_request(&mut bridge).await;
        assert!(matches!(&req.content, Some(RequestContent::ReadParameter(p)) if p.name == "SERVO1_TRIM"));
        let ack = Ack { request_id: req.request_id, success: true, accepted: 0, reason: None, value: Some(1490.0) };
        send_event(&mut bridge, EventContent::Ack(ack)).await;
        let req = read_request(&mut bridge).await;
        let ack = Ack { request_id: req.request_id, success: true, accepted: 0, reason: None, value: None };
        send_event(&mut bridge, EventContent::Ack(ack)).await;
        bridge
    });
    assert_eq!(link.read_parameter("SERVO1_TRIM").await, Ok(1490.0));
    assert!(matches!(link.read_parameter("SERVO9_TRIM").await, Err(CommandError::Rejected(_))));
    let _bridge = bridge_side.await.unwrap();
    shutdown.cancel();
}
