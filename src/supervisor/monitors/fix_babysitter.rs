use crate::keychain::Keychain;
use crate::supervisor::{Monitor, MonitorError};
use crate::telemetry::DriveMode;
use async_trait::async_trait;
use std::time::Duration;

/// Keeps the rover stopped unless it has at least an RTK float fix, outside
/// of manual driving.
#[derive(Debug, Default)]
pub struct FixBabysitter;

impl FixBabysitter {
    const PERIOD: Duration = Duration::from_millis(500);
}

#[async_trait]
impl Monitor for FixBabysitter {
    fn name(&self) -> &'static str { "fix-babysitter" }

    fn period(&self) -> Duration { Self::PERIOD }

    async fn tick(&mut self, k: &Keychain) -> Result<(), MonitorError> {
        let telemetry = k.telemetry().read().await;
        match telemetry.mode() {
            None | Some(DriveMode::Manual) => return Ok(()),
            Some(_) => {}
        }
        let fix = telemetry.fix();
        if fix.is_some_and(|f| f.is_rtk()) {
            return Ok(());
        }
        let reported = fix.map_or_else(|| String::from("none"), |f| f.fix_type.to_string());
        k.notifier().intervention(
            self.name(),
            format!("GPS fix type {reported} is below RTK float, cutting power and holding"),
        );
        k.arbiter().kill(self.name()).await;
        Ok(())
    }
}
