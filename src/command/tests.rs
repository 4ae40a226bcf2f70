use super::mock::{RecordingSink, Sent};
use super::CommandChannel;
use crate::mission::Waypoint;
use crate::telemetry::DriveMode;

#[tokio::test(start_paused = true)]
async fn test_hold_is_sent_twice() {
    let sink = RecordingSink::new();
    let cmd = CommandChannel::new(sink.clone());
    cmd.hold().await.unwrap();
    assert_eq!(
        sink.sent(),
        vec![Sent::Disarm, Sent::Mode(DriveMode::Hold), Sent::Mode(DriveMode::Hold)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_start_arms_twice() {
    let sink = RecordingSink::new();
    let cmd = CommandChannel::new(sink.clone());
    cmd.start().await.unwrap();
    assert_eq!(sink.count(|s| *s == Sent::Arm), 2);
    assert_eq!(sink.count(|s| *s == Sent::Mode(DriveMode::Auto)), 2);
    assert_eq!(sink.sent().first(), Some(&Sent::Disarm));
}

#[tokio::test]
async fn test_upload_clears_first() {
    let sink = RecordingSink::new();
    let cmd = CommandChannel::new(sink.clone());
    let pts = vec![Waypoint::new(1.0, 2.0), Waypoint::new(1.0, 2.0)];
    assert_eq!(cmd.upload_mission(&pts).await, Ok(2));
    assert_eq!(sink.sent(), vec![Sent::Clear, Sent::Upload(pts)]);
}

#[tokio::test(start_paused = true)]
async fn test_manual_flag_follows_mode() {
    let sink = RecordingSink::new();
    let cmd = CommandChannel::new(sink.clone());
    cmd.enter_manual(1500, 1500).await.unwrap();
    assert!(cmd.manual_via_joystick());
    assert_eq!(&sink.sent()[..2], &[Sent::Override(1, 1500), Sent::Override(3, 1500)]);
    cmd.hold().await.unwrap();
    assert!(!cmd.manual_via_joystick());
}
