use super::http_request::HTTPRequestType;
use super::http_response::{ResponseError, unwrap_return_code};

/// A simple wrapper around `reqwest::Client` used to manage HTTP requests
/// with a preconfigured base URL and default settings.
///
/// It sets a fixed timeout and allows easy reuse of the HTTP client infrastructure.
#[derive(Debug)]
pub struct HTTPClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL for the API, prepended to all endpoint paths.
    base_url: String,
}

impl HTTPClient {
    const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

    /// Constructs a new `HTTPClient` with the given base URL.
    ///
    /// # Arguments
    /// * `base_url` – The root URL for all HTTP requests (e.g., `"https://example.com"`),
    ///   a trailing slash is dropped.
    pub fn new(base_url: &str) -> Result<HTTPClient, reqwest::Error> {
        Ok(HTTPClient {
            client: reqwest::Client::builder().timeout(Self::TIMEOUT).build()?,
            base_url: String::from(base_url.trim_end_matches('/')),
        })
    }

    /// Returns the base URL that the client was initialized with.
    pub fn url(&self) -> &str { self.base_url.as_str() }

    /// Issues `request` as a GET and parses its JSON answer.
    pub(crate) async fn get<T: HTTPRequestType>(
        &self,
        request: &T,
    ) -> Result<T::Response, ResponseError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, request.endpoint()))
            .headers(request.header_params())
            .send()
            .await?;
        Ok(unwrap_return_code(response)?.json::<T::Response>().await?)
    }
}
