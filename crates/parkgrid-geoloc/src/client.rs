//! HTTP client for an ipapi-style IP-geolocation endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use parkgrid_core::Coordinate;

use crate::error::LocationError;
use crate::retry::retry_with_backoff;
use crate::source::LocationSource;

/// Body of a successful lookup. Services return `null` coordinates when the
/// caller's address cannot be resolved, so both fields stay optional.
#[derive(Debug, Deserialize)]
struct IpLocateResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Client for a `GET {base_url}/json/` IP-geolocation endpoint.
///
/// Maps the service's failure modes onto the location error taxonomy:
/// 401/403 become [`LocationError::PermissionDenied`], 429 becomes
/// [`LocationError::RateLimited`] (retried with exponential backoff), a
/// request timeout becomes [`LocationError::Timeout`], and a body without a
/// usable coordinate pair becomes [`LocationError::PositionUnavailable`].
pub struct IpLocateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl IpLocateClient {
    /// Creates an `IpLocateClient` with configured timeout, `User-Agent`,
    /// optional API key, and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure for retriable errors (429, network errors). Set to `0` to
    /// disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            timeout_secs,
            max_retries,
            backoff_base_secs,
        })
    }

    fn lookup_url(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}/json/?key={key}", self.base_url),
            None => format!("{}/json/", self.base_url),
        }
    }

    /// Resolve the caller's approximate position, with automatic retry on
    /// transient errors.
    ///
    /// # Errors
    ///
    /// - [`LocationError::PermissionDenied`] — HTTP 401/403 (not retried).
    /// - [`LocationError::PositionUnavailable`] — body carries no usable fix (not retried).
    /// - [`LocationError::Timeout`] — request exceeded the configured timeout (not retried).
    /// - [`LocationError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`LocationError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`LocationError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`LocationError::Deserialize`] — response body is not valid JSON (not retried).
    pub async fn fetch_position(&self) -> Result<Coordinate, LocationError> {
        let url = self.lookup_url();
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move { self.fetch_position_once(&url).await }
        })
        .await
    }

    async fn fetch_position_once(&self, url: &str) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LocationError::PermissionDenied {
                    reason: format!(
                        "geolocation service rejected the request (HTTP {})",
                        status.as_u16()
                    ),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);
                return Err(LocationError::RateLimited { retry_after_secs });
            }
            _ => {
                return Err(LocationError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let parsed: IpLocateResponse =
            serde_json::from_str(&body).map_err(|e| LocationError::Deserialize {
                context: format!("geolocation response from {url}"),
                source: e,
            })?;

        position_from(&parsed)
    }

    fn map_request_error(&self, err: reqwest::Error) -> LocationError {
        if err.is_timeout() {
            LocationError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            LocationError::Http(err)
        }
    }
}

impl LocationSource for IpLocateClient {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.fetch_position().await
    }
}

fn position_from(response: &IpLocateResponse) -> Result<Coordinate, LocationError> {
    let (Some(latitude), Some(longitude)) = (response.latitude, response.longitude) else {
        return Err(LocationError::PositionUnavailable {
            reason: "geolocation service returned no coordinates".to_owned(),
        });
    };

    Coordinate::new(latitude, longitude).map_err(|e| LocationError::PositionUnavailable {
        reason: e.to_string(),
    })
}
