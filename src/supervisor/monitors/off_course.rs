use crate::keychain::Keychain;
use crate::supervisor::{BreachTimer, Monitor, MonitorError};
use async_trait::async_trait;
use std::time::Duration;

/// Restarts the drive when the cross-track error stays too large.
#[derive(Debug, Default)]
pub struct OffCourseMonitor {
    breach: BreachTimer,
}

impl OffCourseMonitor {
    pub const MAX_XTRACK_M: f64 = 1.0;
    pub const MAX_BREACH: Duration = Duration::from_secs(5);
    pub const PAUSE: Duration = Duration::from_secs(5);
    const PERIOD: Duration = Duration::from_secs(1);
}

#[async_trait]
impl Monitor for OffCourseMonitor {
    fn name(&self) -> &'static str { "off-course" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        if !k.pager().view().await.in_progress() {
            self.breach.reset();
            return Ok(());
        }
        let xtrack = k.telemetry().read().await.xtrack_error().map(|x| (x * 100.0).round() / 100.0);
        let Some(xtrack) = xtrack.filter(|x| *x > Self::MAX_XTRACK_M) else {
            self.breach.reset();
            return Ok(());
        };
        let held = self.breach.breached();
        if held > Self::MAX_BREACH {
            k.notifier().intervention(
                self.name(),
                format!(
                    "cross-track error {xtrack}m > {}m for {:.1}s, stopping for {}s",
                    Self::MAX_XTRACK_M,
                    held.as_secs_f64(),
                    Self::PAUSE.as_secs()
                ),
            );
            k.arbiter().cycle(self.name(), Self::PAUSE).await;
            self.breach.reset();
        }
        Ok(())
    }
}
