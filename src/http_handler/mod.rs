mod http_client;
mod http_request;
mod http_response;
mod robot_config;
#[cfg(test)]
mod tests;

pub use http_client::HTTPClient;
pub use http_response::ResponseError;
pub use robot_config::{PollerSetupError, RobotConfigPoller};
