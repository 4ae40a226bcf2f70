use super::*;
use crate::command::mock::{RecordingSink, Sent};
use crate::config::{Config, PagingConfig};
use crate::keychain::Keychain;
use crate::telemetry::{DriveMode, GlobalPosition, Heartbeat, MissionProgress, TelemetryMsg};
use rand::Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn keychain_with(store: Arc<dyn MissionStore>) -> (Arc<RecordingSink>, Keychain) {
    let sink = RecordingSink::new();
    let k = Keychain::new(Config::default(), sink.clone(), store, CancellationToken::new());
    (sink, k)
}

fn keychain() -> (Arc<RecordingSink>, Keychain) {
    keychain_with(Arc::new(MemoryMissionStore::default()))
}

#[allow(clippy::cast_precision_loss)]
fn mission(len: usize) -> Vec<Waypoint> {
    (0..len).map(|i| Waypoint::new(30.0 + i as f64 * 1e-4, -87.0)).collect()
}

async fn set_seq(k: &Keychain, seq: u16) {
    k.telemetry().update(TelemetryMsg::MissionProgress(MissionProgress { seq })).await;
}

async fn set_auto(k: &Keychain) {
    let hb = Heartbeat { custom_mode: 10, system_status: 4, armed: true };
    k.telemetry().update(TelemetryMsg::Heartbeat(hb)).await;
}

fn position_of(sent: &[Sent], pred: impl Fn(&Sent) -> bool) -> usize {
    sent.iter().position(pred).unwrap()
}

#[test]
fn test_pages_cover_mission_with_single_overlap() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let len = rng.random_range(1..600);
        let cfg = PagingConfig {
            initial_page_size: rng.random_range(1..150),
            subsequent_page_size: rng.random_range(5..300),
        };
        let mut state = PagingState::with_mission(mission(len), &cfg);
        let mut pages = vec![state.page().unwrap()];
        while let Some(next) = state.next_window(&cfg) {
            state = state.with_page(next);
            pages.push(next);
        }
        assert_eq!(pages[0].start, 0);
        assert_eq!(pages.last().unwrap().end, len - 1);
        assert!(pages[0].end <= cfg.initial_page_size);
        for pair in pages.windows(2) {
            assert_eq!(pair[1].start, pair[0].end, "one index overlap");
            assert!(pair[1].end - pair[1].start <= cfg.subsequent_page_size);
            assert!(pair[1].end > pair[0].end);
        }
    }
}

#[test]
fn test_prior_window_walks_back_to_initial() {
    let cfg = PagingConfig { initial_page_size: 100, subsequent_page_size: 250 };
    let mut state = PagingState::with_mission(mission(1000), &cfg);
    for _ in 0..3 {
        state = state.with_page(state.next_window(&cfg).unwrap());
    }
    assert_eq!(state.page(), Some(PageBounds { start: 600, end: 850 }));
    let prior = state.prior_window(&cfg).unwrap();
    assert_eq!(prior, PageBounds { start: 350, end: 600 });
    let prior = state.with_page(prior).prior_window(&cfg).unwrap();
    assert_eq!(prior, PageBounds { start: 100, end: 350 });
    let prior = state.with_page(prior).prior_window(&cfg).unwrap();
    assert_eq!(prior, PageBounds { start: 0, end: 100 });
    assert_eq!(state.with_page(prior).prior_window(&cfg), None);
}

#[test]
fn test_loaded_set_duplicates_home() {
    let cfg = PagingConfig::default();
    let state = PagingState::with_mission(mission(5), &cfg);
    assert_eq!(state.loaded().len(), 6);
    assert_eq!(state.loaded()[0], state.loaded()[1]);
    assert_eq!(state.last_seq(), Some(5));
    assert_eq!(state.waypoint_at_seq(0), state.waypoint_at_seq(1));
}

#[tokio::test(start_paused = true)]
async fn test_load_next_page_until_end() {
    let (sink, k) = keychain();
    let pager = k.pager();
    assert!(pager.load_mission(mission(600)).await);
    assert!(pager.load_next_page().await);
    assert!(pager.load_next_page().await);
    assert_eq!(pager.page().await, Some(PageBounds { start: 350, end: 599 }));
    assert!(!pager.load_next_page().await);
    assert_eq!(sink.uploads().len(), 3);
    assert_eq!(sink.uploads()[1].len(), 252);
}

#[tokio::test(start_paused = true)]
async fn test_load_prior_page_returns_last_seq() {
    let (sink, k) = keychain();
    let pager = k.pager();
    assert!(pager.load_mission(mission(300)).await);
    assert!(matches!(pager.load_prior_page().await, Err(PagingError::NoPage)));
    assert!(pager.load_next_page().await);
    assert_eq!(pager.page().await, Some(PageBounds { start: 100, end: 299 }));

    assert_eq!(pager.load_prior_page().await.unwrap(), 101);
    assert_eq!(pager.page().await, Some(PageBounds { start: 0, end: 100 }));
    assert_eq!(sink.uploads().len(), 3);
    assert!(matches!(pager.load_prior_page().await, Err(PagingError::NoPage)));
    assert_eq!(sink.uploads().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_goto_waypoint_keeps_page() {
    let (sink, k) = keychain();
    let pager = k.pager();
    assert!(pager.load_mission(mission(300)).await);
    let before = pager.state().await;
    sink.clear();
    pager.goto_waypoint(7).await.unwrap();
    assert_eq!(sink.sent(), vec![Sent::Waypoint(7)]);
    assert_eq!(pager.state().await, before);
}

#[tokio::test(start_paused = true)]
async fn test_load_mission_is_idempotent() {
    let (sink, k) = keychain();
    let pager = k.pager();
    assert!(pager.load_mission(mission(300)).await);
    assert!(pager.load_next_page().await);
    assert!(pager.load_mission(mission(300)).await);
    let first = pager.state().await;
    assert!(pager.load_mission(mission(300)).await);
    assert_eq!(pager.state().await, first);
    assert_eq!(first.page(), Some(PageBounds { start: 0, end: 100 }));
    let uploads = sink.uploads();
    assert_eq!(uploads[2], uploads[3]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_upload_keeps_previous_state() {
    let (sink, k) = keychain();
    let pager = k.pager();
    assert!(!pager.load_mission(Vec::new()).await);
    assert!(pager.page().await.is_none());
    assert!(pager.load_mission(mission(10)).await);
    sink.reject_uploads();
    assert!(!pager.load_mission(mission(20)).await);
    assert_eq!(pager.state().await.mission().len(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_goto_next_inside_page_loads_nothing() {
    let (sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(300)).await;
    set_seq(&k, 5).await;
    sink.clear();
    assert_eq!(pager.goto_next().await.unwrap(), 6);
    assert_eq!(sink.sent(), vec![Sent::Waypoint(6)]);
}

#[tokio::test(start_paused = true)]
async fn test_goto_next_at_page_end_loads_once_before_goto() {
    let (sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(300)).await;
    set_seq(&k, 101).await;
    sink.clear();
    assert_eq!(pager.goto_next().await.unwrap(), 2);
    let sent = sink.sent();
    assert_eq!(sink.uploads().len(), 1);
    let upload = position_of(&sent, |s| matches!(s, Sent::Upload(_)));
    let goto = position_of(&sent, |s| matches!(s, Sent::Waypoint(_)));
    assert!(upload < goto);
    assert_eq!(sent[goto], Sent::Waypoint(2));
    assert_eq!(pager.page().await, Some(PageBounds { start: 100, end: 299 }));
}

#[tokio::test(start_paused = true)]
async fn test_goto_next_pauses_auto_drive() {
    let (sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(300)).await;
    set_seq(&k, 101).await;
    set_auto(&k).await;
    sink.clear();
    pager.goto_next().await.unwrap();
    let sent = sink.sent();
    let hold = position_of(&sent, |s| *s == Sent::Mode(DriveMode::Hold));
    let upload = position_of(&sent, |s| matches!(s, Sent::Upload(_)));
    let goto = position_of(&sent, |s| matches!(s, Sent::Waypoint(2)));
    let resume = position_of(&sent, |s| *s == Sent::Mode(DriveMode::Auto));
    assert!(hold < upload && upload < goto && goto < resume);
}

#[tokio::test(start_paused = true)]
async fn test_goto_previous_at_page_start_loads_prior_once() {
    let (sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(300)).await;
    pager.load_next_page().await;
    set_seq(&k, 1).await;
    sink.clear();
    assert_eq!(pager.goto_previous().await.unwrap(), 100);
    assert_eq!(sink.uploads().len(), 1);
    assert_eq!(pager.page().await, Some(PageBounds { start: 0, end: 100 }));

    set_seq(&k, 50).await;
    sink.clear();
    assert_eq!(pager.goto_previous().await.unwrap(), 49);
    assert!(sink.uploads().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_plus_50_translates_across_pages() {
    let (_sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(300)).await;
    set_seq(&k, 80).await;
    // 21 points remain on the page, 50 - 21 + 1 lands on sequence 30
    assert_eq!(pager.goto_plus_50().await.unwrap(), 30);
    assert_eq!(pager.page().await, Some(PageBounds { start: 100, end: 299 }));

    set_seq(&k, 190).await;
    assert_eq!(pager.goto_plus_50().await.unwrap(), 200);
}

#[tokio::test(start_paused = true)]
async fn test_minus_50_translates_across_pages() {
    let (_sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(300)).await;
    pager.load_next_page().await;
    set_seq(&k, 20).await;
    assert_eq!(pager.goto_minus_50().await.unwrap(), 70);
    assert_eq!(pager.page().await, Some(PageBounds { start: 0, end: 100 }));

    set_seq(&k, 20).await;
    assert_eq!(pager.goto_minus_50().await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_needs_progress() {
    let (_sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(10)).await;
    assert!(matches!(pager.goto_next().await, Err(PagingError::NoProgress)));
}

#[tokio::test]
async fn test_distance_to_waypoint() {
    let (_sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(vec![Waypoint::new(30.0, -87.0), Waypoint::new(30.001, -87.0)]).await;
    assert_eq!(pager.distance_to_waypoint(WaypointDirection::Next).await, -1.0);

    let pos = GlobalPosition { lat: 30.0, lng: -87.0, heading_deg: 0.0 };
    k.telemetry().update(TelemetryMsg::Position(pos)).await;
    assert_eq!(pager.distance_to_waypoint(WaypointDirection::Next).await, -1.0);

    set_seq(&k, 2).await;
    let d = pager.distance_to_waypoint(WaypointDirection::Next).await;
    assert!((d - 111.2).abs() < 0.5, "{d}");
    assert_eq!(pager.distance_to_waypoint(WaypointDirection::Previous).await, 0.0);

    set_seq(&k, 1).await;
    assert_eq!(pager.distance_to_waypoint(WaypointDirection::Previous).await, -1.0);
    set_seq(&k, 3).await;
    assert_eq!(pager.distance_to_waypoint(WaypointDirection::Next).await, -1.0);
}

#[tokio::test]
async fn test_next_waypoint_maps_home_to_first() {
    let (_sink, k) = keychain();
    let pager = k.pager();
    pager.load_mission(mission(3)).await;
    assert_eq!(pager.next_waypoint().await, None);
    set_seq(&k, 0).await;
    assert_eq!(pager.next_waypoint().await, Some(mission(3)[0].rounded()));
    set_seq(&k, 3).await;
    assert_eq!(pager.next_waypoint().await, Some(mission(3)[2].rounded()));
}

#[tokio::test]
async fn test_file_store_restores_pager() {
    let path = std::env::temp_dir().join(format!("rover-test-{}.bin", rand::rng().random::<u64>()));
    let store: Arc<dyn MissionStore> = Arc::new(FileMissionStore::new(&path));
    assert!(store.load().await.unwrap().is_none());

    let (_sink, k) = keychain_with(Arc::clone(&store));
    k.pager().load_mission(mission(400)).await;
    k.pager().load_next_page().await;
    let expected = k.pager().state().await;

    let (sink, restored) = keychain_with(store);
    assert!(restored.pager().restore().await.unwrap());
    assert_eq!(restored.pager().state().await, expected);
    assert!(sink.sent().is_empty());
    let _ = std::fs::remove_file(path);
}
