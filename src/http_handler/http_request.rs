use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};

pub(crate) trait HTTPRequestType {
    /// Type of the expected JSON response.
    type Response: for<'de> serde::Deserialize<'de>;
    /// Path relative to the client's base URL.
    fn endpoint(&self) -> String;
    fn header_params(&self) -> HeaderMap;
}

/// Request type for the `/api/robot/{id}/` endpoint.
#[derive(Debug, Clone)]
pub(crate) struct RobotConfigRequest {
    robot_id: String,
    authorization: HeaderValue,
}

impl RobotConfigRequest {
    pub(crate) fn new(robot_id: &str, auth_token: &str) -> Result<Self, InvalidHeaderValue> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {auth_token}"))?;
        authorization.set_sensitive(true);
        Ok(Self { robot_id: String::from(robot_id), authorization })
    }
}

impl HTTPRequestType for RobotConfigRequest {
    type Response = super::http_response::RobotConfigResponse;

    fn endpoint(&self) -> String { format!("/api/robot/{}/?format=json", self.robot_id) }

    fn header_params(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }
}
