use super::*;

#[tokio::test]
async fn test_absent_until_first_sample() {
    let tel = TelemetrySnapshot::new();
    let data = tel.read().await;
    assert!(data.mode().is_none());
    assert!(data.position().is_none());
    assert!(data.seq().is_none());

    tel.update(TelemetryMsg::Nav(NavOutput { xtrack_error: 0.0 })).await;
    // a genuine zero is a value, not "no data"
    assert_eq!(tel.read().await.xtrack_error(), Some(0.0));
    assert!(tel.read().await.compass_variance().is_none());
}

#[tokio::test]
async fn test_update_replaces_whole_kind() {
    let tel = TelemetrySnapshot::new();
    tel.update(TelemetryMsg::MissionProgress(MissionProgress { seq: 3 })).await;
    tel.update(TelemetryMsg::MissionProgress(MissionProgress { seq: 4 })).await;
    assert_eq!(tel.seq().await, Some(4));
}

#[tokio::test]
async fn test_mode_unknown_while_booting() {
    let tel = TelemetrySnapshot::new();
    let hb = Heartbeat { custom_mode: 10, system_status: 0, armed: false };
    tel.update(TelemetryMsg::Heartbeat(hb)).await;
    assert_eq!(tel.mode().await, None);
    tel.update(TelemetryMsg::Heartbeat(Heartbeat { system_status: 4, ..hb })).await;
    assert_eq!(tel.mode().await, Some(DriveMode::Auto));
}

#[test]
fn test_drive_mode_codes() {
    for mode in [DriveMode::Manual, DriveMode::Hold, DriveMode::Auto, DriveMode::Initialising] {
        assert_eq!(DriveMode::from(mode.custom_mode()), mode);
    }
    assert_eq!(DriveMode::from(11), DriveMode::Other(11));
    assert_eq!(DriveMode::Other(11).to_string(), "unknown mode: 11");
}
