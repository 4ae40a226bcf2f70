use super::{MissionStore, PageBounds, PagingState, StoreError, Waypoint};
use crate::command::{CommandChannel, CommandError};
use crate::config::PagingConfig;
use crate::supervisor::Arbiter;
use crate::telemetry::{DriveMode, TelemetrySnapshot};
use crate::{error, info, warn};
use std::sync::Arc;
use strum_macros::Display;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Proof that the caller holds the pager's transition lock.
pub(super) type Transition<'a> = MutexGuard<'a, ()>;

#[derive(Debug, Display)]
pub enum PagingError {
    /// No mission has been loaded yet.
    NoMission,
    /// The autopilot has not reported its active sequence yet.
    NoProgress,
    /// There is no page in the requested direction.
    NoPage,
    /// The autopilot accepted zero waypoints.
    UploadRejected,
    Command(CommandError),
}

impl std::error::Error for PagingError {}

impl From<CommandError> for PagingError {
    fn from(value: CommandError) -> Self { PagingError::Command(value) }
}

/// Which neighbour of the active sequence a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointDirection {
    Next,
    Previous,
}

/// What a monitor needs to know about the mission on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissionView {
    pub mode: Option<DriveMode>,
    pub seq: Option<u16>,
    pub last_seq: Option<u16>,
    pub has_next_page: bool,
}

impl MissionView {
    /// Driving in Auto somewhere strictly between home and the page's last point.
    pub fn in_progress(&self) -> bool {
        match (self.mode, self.seq, self.last_seq) {
            (Some(DriveMode::Auto), Some(seq), Some(last)) => seq != 0 && seq != last,
            _ => false,
        }
    }
}

/// Owns the mission and keeps the page resident in the autopilot in sync with it.
///
/// Readers go through the state lock, which is only ever held briefly. Every
/// flow that uploads a page and then repositions inside it takes the
/// transition lock first, so a page load is complete before any waypoint
/// command referencing the new page is sent.
pub struct MissionPager {
    state: RwLock<PagingState>,
    transition: Mutex<()>,
    cfg: PagingConfig,
    pub(super) cmd: Arc<CommandChannel>,
    pub(super) telemetry: Arc<TelemetrySnapshot>,
    pub(super) arbiter: Arc<Arbiter>,
    store: Arc<dyn MissionStore>,
}

impl MissionPager {
    pub fn new(
        cfg: PagingConfig,
        cmd: Arc<CommandChannel>,
        telemetry: Arc<TelemetrySnapshot>,
        arbiter: Arc<Arbiter>,
        store: Arc<dyn MissionStore>,
    ) -> Self {
        Self {
            state: RwLock::new(PagingState::default()),
            transition: Mutex::new(()),
            cfg,
            cmd,
            telemetry,
            arbiter,
            store,
        }
    }

    pub async fn state(&self) -> PagingState { self.state.read().await.clone() }

    pub async fn page(&self) -> Option<PageBounds> { self.state.read().await.page() }

    pub async fn view(&self) -> MissionView {
        let telemetry = self.telemetry.read().await;
        let state = self.state.read().await;
        MissionView {
            mode: telemetry.mode(),
            seq: telemetry.seq(),
            last_seq: state.last_seq(),
            has_next_page: state.has_next_page(),
        }
    }

    /// Reinstates the persisted mission and bounds without uploading anything.
    pub async fn restore(&self) -> Result<bool, StoreError> {
        let Some(snapshot) = self.store.load().await? else {
            return Ok(false);
        };
        let restored = PagingState::from_snapshot(snapshot);
        let Some(page) = restored.page() else {
            return Err(StoreError::Corrupt);
        };
        info!(
            "Restored mission of {} points, page {}..={}",
            restored.mission().len(),
            page.start,
            page.end
        );
        *self.state.write().await = restored;
        Ok(true)
    }

    /// Replaces the mission and uploads its first page.
    ///
    /// Returns whether the autopilot accepted a nonzero number of waypoints.
    pub async fn load_mission(&self, waypoints: Vec<Waypoint>) -> bool {
        let t = self.transition.lock().await;
        self.load_mission_locked(&t, waypoints).await.is_ok()
    }

    /// Uploads the window following the loaded page. False if none remains.
    pub async fn load_next_page(&self) -> bool {
        let t = self.transition.lock().await;
        self.load_next_page_locked(&t).await.is_ok()
    }

    /// Uploads the window preceding the loaded page and returns its last sequence.
    pub async fn load_prior_page(&self) -> Result<u16, PagingError> {
        let t = self.transition.lock().await;
        self.load_prior_page_locked(&t).await.map(|p| p.last_seq())
    }

    /// Points the autopilot at sequence `seq` of the loaded page.
    pub async fn goto_waypoint(&self, seq: u16) -> Result<(), PagingError> {
        let _t = self.transition.lock().await;
        Ok(self.cmd.set_active_waypoint(seq).await?)
    }

    /// Haversine distance in metres to the neighbouring waypoint, `-1` if unknown.
    pub async fn distance_to_waypoint(&self, direction: WaypointDirection) -> f64 {
        self.try_distance_to_waypoint(direction).await.unwrap_or(-1.0)
    }

    pub async fn try_distance_to_waypoint(&self, direction: WaypointDirection) -> Option<f64> {
        let telemetry = self.telemetry.read().await;
        let position = telemetry.position()?.as_waypoint();
        let seq = telemetry.seq()?.max(1);
        let target = match direction {
            WaypointDirection::Next => seq,
            WaypointDirection::Previous => seq.checked_sub(1).filter(|s| *s >= 1)?,
        };
        let waypoint = self.state.read().await.loaded().get(usize::from(target)).copied()?;
        Some(position.distance_to(&waypoint))
    }

    /// The point the autopilot is currently driving towards.
    pub async fn next_waypoint(&self) -> Option<Waypoint> {
        let seq = self.telemetry.seq().await?;
        self.state.read().await.waypoint_at_seq(seq)
    }

    pub(super) async fn lock_transition(&self) -> Transition<'_> { self.transition.lock().await }

    pub(super) async fn load_mission_locked(
        &self,
        t: &Transition<'_>,
        waypoints: Vec<Waypoint>,
    ) -> Result<PageBounds, PagingError> {
        if waypoints.is_empty() {
            warn!("Refusing to load an empty mission");
            return Err(PagingError::NoMission);
        }
        let mission = waypoints.into_iter().map(Waypoint::rounded).collect();
        let next = PagingState::with_mission(mission, &self.cfg);
        info!("Loading mission of {} points", next.mission().len());
        self.upload(t, next).await
    }

    pub(super) async fn load_next_page_locked(
        &self,
        t: &Transition<'_>,
    ) -> Result<PageBounds, PagingError> {
        let next = {
            let state = self.state.read().await;
            let page = state.next_window(&self.cfg).ok_or(PagingError::NoPage)?;
            state.with_page(page)
        };
        self.upload(t, next).await
    }

    pub(super) async fn load_prior_page_locked(
        &self,
        t: &Transition<'_>,
    ) -> Result<PageBounds, PagingError> {
        let prior = {
            let state = self.state.read().await;
            let page = state.prior_window(&self.cfg).ok_or(PagingError::NoPage)?;
            state.with_page(page)
        };
        self.upload(t, prior).await
    }

    /// Uploads the page of `next`, then commits and persists it.
    ///
    /// The state lock is not held during the upload; the transition lock
    /// keeps other writers out.
    async fn upload(&self, _t: &Transition<'_>, next: PagingState) -> Result<PageBounds, PagingError> {
        let page = next.page().ok_or(PagingError::NoMission)?;
        let accepted = match self.cmd.upload_mission(next.loaded()).await {
            Ok(count) => count,
            Err(e) => {
                error!("Uploading page {}..={} failed: {e}", page.start, page.end);
                return Err(e.into());
            }
        };
        if accepted == 0 {
            error!("Autopilot accepted no waypoints for page {}..={}", page.start, page.end);
            return Err(PagingError::UploadRejected);
        }
        info!("Loaded page {}..={} ({accepted} waypoints)", page.start, page.end);
        let snapshot = next.snapshot();
        *self.state.write().await = next;
        if let Some(snapshot) = snapshot {
            if let Err(e) = self.store.save(&snapshot).await {
                warn!("Persisting mission snapshot failed: {e}");
            }
        }
        Ok(page)
    }
}
