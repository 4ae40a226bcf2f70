use crate::keychain::Keychain;
use crate::supervisor::{BreachTimer, Monitor, MonitorError};
use async_trait::async_trait;
use std::time::Duration;

/// Cuts power once the EKF compass variance stays at or above its limit.
///
/// A variance that high means the autopilot ignores the compass and starts
/// weaving, so this check runs regardless of the drive mode.
#[derive(Debug, Default)]
pub struct CompassMonitor {
    breach: BreachTimer,
}

impl CompassMonitor {
    pub const VARIANCE_LIMIT: f64 = 10.0;
    pub const MAX_BREACH: Duration = Duration::from_secs(10);
    const PERIOD: Duration = Duration::from_secs(1);
}

#[async_trait]
impl Monitor for CompassMonitor {
    fn name(&self) -> &'static str { "compass" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let variance = k.telemetry().read().await.compass_variance();
        let Some(variance) = variance.filter(|v| *v >= Self::VARIANCE_LIMIT) else {
            self.breach.reset();
            return Ok(());
        };
        let held = self.breach.breached();
        if held > Self::MAX_BREACH {
            k.notifier().intervention(
                self.name(),
                format!(
                    "compass variance {variance:.2} >= {} for {:.1}s, cutting power and holding",
                    Self::VARIANCE_LIMIT,
                    held.as_secs_f64()
                ),
            );
            k.arbiter().kill(self.name()).await;
            self.breach.reset();
        }
        Ok(())
    }
}
