use super::http_client::HTTPClient;
use super::http_request::RobotConfigRequest;
use super::http_response::ResponseError;
use crate::config::RemoteConfig;
use crate::{error, event, info};
use reqwest::header::InvalidHeaderValue;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Periodically fetches the robot's remote configuration and publishes its
/// battery multiplier.
pub struct RobotConfigPoller {
    client: HTTPClient,
    request: RobotConfigRequest,
    battery_multiplier: watch::Sender<f64>,
}

impl RobotConfigPoller {
    const POLL_PERIOD: Duration = Duration::from_secs(15);
    const RETRY_DELAY: Duration = Duration::from_secs(1);

    pub fn new(
        remote: &RemoteConfig,
        battery_multiplier: watch::Sender<f64>,
    ) -> Result<Self, PollerSetupError> {
        Ok(Self {
            client: HTTPClient::new(&remote.base_url)?,
            request: RobotConfigRequest::new(&remote.robot_id, &remote.auth_token)?,
            battery_multiplier,
        })
    }

    /// Fetches once and applies the result; an absent or zero multiplier
    /// leaves the current one untouched.
    pub async fn poll_once(&self) -> Result<f64, ResponseError> {
        let config = self.client.get(&self.request).await?;
        if let Some(multiplier) = config.battery_multiplier.filter(|m| *m != 0.0 && m.is_finite()) {
            self.battery_multiplier.send_if_modified(|current| {
                let changed = *current != multiplier;
                *current = multiplier;
                changed
            });
        }
        Ok(*self.battery_multiplier.borrow())
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!("Polling robot configuration from {}", self.client.url());
        let mut errors = 0u32;
        loop {
            let wait = match self.poll_once().await {
                Ok(multiplier) => {
                    event!("Battery multiplier: {multiplier}");
                    Self::POLL_PERIOD
                }
                Err(e) => {
                    errors += 1;
                    error!("Fetching robot configuration failed ({errors} so far): {e}");
                    Self::RETRY_DELAY
                }
            };
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = sleep(wait) => {}
            }
        }
    }
}

#[derive(Debug, strum_macros::Display)]
pub enum PollerSetupError {
    Client(reqwest::Error),
    Token(InvalidHeaderValue),
}

impl std::error::Error for PollerSetupError {}

impl From<reqwest::Error> for PollerSetupError {
    fn from(value: reqwest::Error) -> Self { PollerSetupError::Client(value) }
}

impl From<InvalidHeaderValue> for PollerSetupError {
    fn from(value: InvalidHeaderValue) -> Self { PollerSetupError::Token(value) }
}
