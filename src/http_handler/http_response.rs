use strum_macros::Display;

/// The parts of the robot's remote configuration this process cares about.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub(crate) struct RobotConfigResponse {
    /// Scale applied to the raw battery voltage, unset or zero means no override.
    #[serde(default)]
    pub(crate) battery_multiplier: Option<f64>,
}

#[derive(Debug, Display)]
pub enum ResponseError {
    InternalServer,
    Unauthorized,
    BadRequest(u16),
    NoConnection,
    Timeout,
    MalformedBody,
    Unknown,
}

impl std::error::Error for ResponseError {}

impl From<reqwest::Error> for ResponseError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            ResponseError::Timeout
        } else if value.is_connect() {
            ResponseError::NoConnection
        } else if value.is_decode() {
            ResponseError::MalformedBody
        } else {
            ResponseError::Unknown
        }
    }
}

pub(crate) fn unwrap_return_code(
    response: reqwest::Response,
) -> Result<reqwest::Response, ResponseError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status.is_server_error() {
        Err(ResponseError::InternalServer)
    } else if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Err(ResponseError::Unauthorized)
    } else if status.is_client_error() {
        Err(ResponseError::BadRequest(status.as_u16()))
    } else {
        Err(ResponseError::Unknown)
    }
}
