// OpenWeatherMap HTTP client.
// Handles the API key, timeouts and mapping of HTTP failures to errors.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::config::Units;
use crate::error::{Result, SkybarError};

const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeatherMap client bound to one API key.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: Units,
}

impl OpenWeatherClient {
    /// Create a client against the public API.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, OPENWEATHER_API_BASE)
    }

    /// Create a client against another host (used by tests).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("skybar/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SkybarError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            units: Units::default(),
        })
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Make a GET request with query parameters; the API key is appended.
    pub async fn get_with_params(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(SkybarError::Api)?;

        check_response(response).await
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::OK => Ok(response),
        StatusCode::UNAUTHORIZED => Err(SkybarError::Fetch(
            "OpenWeatherMap rejected the API key".to_string(),
        )),
        StatusCode::NOT_FOUND => Err(SkybarError::NotFound(response.url().path().to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(SkybarError::RateLimited),
        status => Err(SkybarError::Fetch(format!(
            "HTTP {}: {}",
            status,
            response.text().await.unwrap_or_default()
        ))),
    }
}
