use super::{MissionPager, PageBounds, PagingError, pager::Transition};
use crate::command::CommandChannel;
use crate::telemetry::DriveMode;
use crate::info;
use std::time::Duration;
use strum_macros::Display;
use tokio::time::sleep;

/// Operator navigation request relative to the active waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NavStep {
    Next,
    Previous,
    Plus50,
    Minus50,
}

impl NavStep {
    fn delta(self) -> i64 {
        match self {
            NavStep::Next => 1,
            NavStep::Previous => -1,
            NavStep::Plus50 => 50,
            NavStep::Minus50 => -50,
        }
    }
}

/// Source tag for interventions issued by navigation flows.
const NAV_SOURCE: &str = "navigation";
/// Pause between stopping at the end of a mission and reloading it.
const END_OF_MISSION_SETTLE: Duration = Duration::from_secs(1);

impl MissionPager {
    pub async fn goto_next(&self) -> Result<u16, PagingError> { self.navigate(NavStep::Next).await }

    pub async fn goto_previous(&self) -> Result<u16, PagingError> {
        self.navigate(NavStep::Previous).await
    }

    pub async fn goto_plus_50(&self) -> Result<u16, PagingError> {
        self.navigate(NavStep::Plus50).await
    }

    pub async fn goto_minus_50(&self) -> Result<u16, PagingError> {
        self.navigate(NavStep::Minus50).await
    }

    /// Moves the active waypoint by `step`, loading an adjacent page if the
    /// target lies outside the loaded one. Returns the sequence number sent.
    ///
    /// Targets beyond the mission's ends are clamped to the page's first or
    /// last sequence.
    pub async fn navigate(&self, step: NavStep) -> Result<u16, PagingError> {
        let t = self.lock_transition().await;
        let seq = self.telemetry.seq().await.ok_or(PagingError::NoProgress)?;
        let (page, has_next, has_prior) = {
            let state = self.state().await;
            (state.page().ok_or(PagingError::NoMission)?, state.has_next_page(), state.has_prior_page())
        };
        // home and sequence 1 are the same point; stepping back starts from 1
        let from = if step.delta() < 0 { seq.max(1) } else { seq };
        let target = i64::from(from) + step.delta();
        let last = i64::from(page.last_seq());

        if (target > last && has_next) || (target < 1 && has_prior) {
            return self.cross_page(&t, page, target, step).await;
        }
        let seq = clamp_seq(target, page.last_seq());
        info!("Navigation {step}: waypoint {seq}");
        self.cmd.set_active_waypoint(seq).await?;
        Ok(seq)
    }

    /// Loads the page containing `target` (in `page`'s sequence space) and
    /// repositions inside it, pausing autonomous drive around the upload.
    async fn cross_page(
        &self,
        t: &Transition<'_>,
        page: PageBounds,
        target: i64,
        step: NavStep,
    ) -> Result<u16, PagingError> {
        let absolute = i64::try_from(page.start).unwrap_or(i64::MAX) + target - 1;
        let paused = self.telemetry.mode().await == Some(DriveMode::Auto);
        if paused {
            self.arbiter.hold(NAV_SOURCE).await;
        }
        let loaded = if step.delta() > 0 {
            self.load_next_page_locked(t).await
        } else {
            self.load_prior_page_locked(t).await
        };
        let result = match loaded {
            Ok(new_page) => {
                let start = i64::try_from(new_page.start).unwrap_or(i64::MAX);
                let seq = clamp_seq(absolute - start + 1, new_page.last_seq());
                info!("Navigation {step} crossed into page {}..={}, waypoint {seq}", new_page.start, new_page.end);
                self.reposition(seq).await.map(|()| seq)
            }
            Err(e) => Err(e),
        };
        if paused {
            self.arbiter.start(NAV_SOURCE).await;
        }
        result
    }

    /// Holds, uploads the following page and resumes towards its second
    /// sequence, the first one being where the rover already stands.
    pub async fn continue_on_next_page(&self, source: &'static str) -> Result<(), PagingError> {
        let t = self.lock_transition().await;
        if !self.state().await.has_next_page() {
            return Err(PagingError::NoPage);
        }
        self.arbiter.hold(source).await;
        self.load_next_page_locked(&t).await?;
        self.reposition(2).await?;
        self.arbiter.start(source).await;
        Ok(())
    }

    /// Stops the rover and reloads the mission so the next run starts at its
    /// beginning.
    pub async fn finish_mission(&self, source: &'static str) -> Result<(), PagingError> {
        let t = self.lock_transition().await;
        info!("End of mission, stopping and reloading the mission");
        self.arbiter.hold(source).await;
        sleep(END_OF_MISSION_SETTLE).await;
        let mission = self.state().await.mission().to_vec();
        self.load_mission_locked(&t, mission).await?;
        self.cmd.set_active_waypoint(1).await?;
        Ok(())
    }

    async fn reposition(&self, seq: u16) -> Result<(), PagingError> {
        sleep(CommandChannel::RESEND_DELAY).await;
        self.cmd.set_active_waypoint(seq).await?;
        sleep(CommandChannel::RESEND_DELAY).await;
        Ok(())
    }
}

fn clamp_seq(target: i64, last: u16) -> u16 {
    u16::try_from(target.clamp(1, i64::from(last))).unwrap_or(last)
}
