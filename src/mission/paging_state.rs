use super::{MissionSnapshot, Waypoint};
use crate::config::PagingConfig;

/// Inclusive range of mission indices resident in the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub start: usize,
    pub end: usize,
}

impl PageBounds {
    /// Sequence number of the page's last point; sequence 0 is the home duplicate.
    pub fn last_seq(&self) -> u16 { u16::try_from(self.end - self.start + 1).unwrap_or(u16::MAX) }
}

/// The whole mission together with the window currently uploaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagingState {
    mission: Vec<Waypoint>,
    page: Option<PageBounds>,
    /// Entries as uploaded: home duplicate followed by `mission[start..=end]`.
    loaded: Vec<Waypoint>,
}

impl PagingState {
    /// A state holding `mission` with its first window selected.
    pub fn with_mission(mission: Vec<Waypoint>, cfg: &PagingConfig) -> Self {
        let first = first_window(mission.len(), cfg);
        let mut state = Self { mission, page: None, loaded: Vec::new() };
        if let Some(page) = first {
            state.select(page);
        }
        state
    }

    /// Rebuilds a state from a persisted snapshot without any upload.
    pub fn from_snapshot(snapshot: MissionSnapshot) -> Self {
        let mut state = Self { mission: snapshot.mission, page: None, loaded: Vec::new() };
        state.select(PageBounds { start: snapshot.page_start, end: snapshot.page_end });
        state
    }

    pub fn mission(&self) -> &[Waypoint] { &self.mission }
    pub fn page(&self) -> Option<PageBounds> { self.page }
    pub fn loaded(&self) -> &[Waypoint] { &self.loaded }
    pub fn last_seq(&self) -> Option<u16> { self.page.map(|p| p.last_seq()) }

    pub fn snapshot(&self) -> Option<MissionSnapshot> {
        self.page.map(|p| MissionSnapshot {
            mission: self.mission.clone(),
            page_start: p.start,
            page_end: p.end,
        })
    }

    /// Whether mission points beyond the loaded page remain.
    pub fn has_next_page(&self) -> bool {
        self.page.is_some_and(|p| p.end + 1 < self.mission.len())
    }

    /// Whether the loaded page is not the initial one.
    pub fn has_prior_page(&self) -> bool { self.page.is_some_and(|p| p.start > 0) }

    /// Window following the loaded page, overlapping it by one point.
    pub fn next_window(&self, cfg: &PagingConfig) -> Option<PageBounds> {
        if !self.has_next_page() {
            return None;
        }
        let start = self.page?.end;
        let end = (start + cfg.subsequent_page_size).min(self.mission.len() - 1);
        Some(PageBounds { start, end })
    }

    /// Window preceding the loaded page, ending on its first point.
    ///
    /// Right after the initial page this is the initial window again.
    pub fn prior_window(&self, cfg: &PagingConfig) -> Option<PageBounds> {
        if !self.has_prior_page() {
            return None;
        }
        let current = self.page?;
        if current.start <= cfg.initial_page_size {
            return first_window(self.mission.len(), cfg);
        }
        let start = current.start.saturating_sub(cfg.subsequent_page_size).max(cfg.initial_page_size);
        Some(PageBounds { start, end: current.start })
    }

    /// Same mission, different window.
    pub fn with_page(&self, page: PageBounds) -> Self {
        let mut state = Self { mission: self.mission.clone(), page: None, loaded: Vec::new() };
        state.select(page);
        state
    }

    /// Loaded entry at `seq`, home counting as sequence 1.
    pub fn waypoint_at_seq(&self, seq: u16) -> Option<Waypoint> {
        self.loaded.get(usize::from(seq.max(1))).copied()
    }

    fn select(&mut self, page: PageBounds) {
        self.loaded = match self.mission.get(page.start..=page.end) {
            Some(points) => std::iter::once(points[0]).chain(points.iter().copied()).collect(),
            None => Vec::new(),
        };
        self.page = (!self.loaded.is_empty()).then_some(page);
    }
}

/// The initial window `[0, min(initial_page_size, len - 1)]`.
pub fn first_window(len: usize, cfg: &PagingConfig) -> Option<PageBounds> {
    (len > 0).then(|| PageBounds { start: 0, end: cfg.initial_page_size.min(len - 1) })
}
