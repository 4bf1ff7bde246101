//! HTTP client for the gasoo-service REST API.
//!
//! # Example
//!
//! ```no_run
//! use gasoo_core::ServiceClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ServiceClient::new("http://localhost:5000")?;
//!
//! if let Some(latest) = client.latest_reading().await? {
//!     println!("Cylinder at {:.1}%", latest.level);
//! }
//!
//! client.add_reading(41.5).await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use gasoo_types::{NewReading, Reading, ValveState};

/// HTTP client for the gasoo-service API.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

/// Error type for service client operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceClientError {
    /// The service is not reachable.
    #[error("Service not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
}

impl ServiceClientError {
    /// Whether the API rejected the request as a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceClientError::ApiError { status, .. } if (400..500).contains(status))
    }
}

/// Result type for service client operations.
pub type Result<T> = std::result::Result<T, ServiceClientError>;

/// Valve position as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValveStatus {
    pub state: ValveState,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub changed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
struct ValveRequest {
    state: ValveState,
    confirm: bool,
}

impl ServiceClient {
    /// Create a new service client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the gasoo-service (e.g., "http://localhost:5000")
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(ServiceClientError::Request)?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ServiceClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Most recent readings, newest first.
    pub async fn readings(&self, limit: u32) -> Result<Vec<Reading>> {
        let url = format!("{}/api/readings?limit={}", self.base_url, limit);
        self.get(&url).await
    }

    /// The newest reading, or `None` when the service has no data yet.
    pub async fn latest_reading(&self) -> Result<Option<Reading>> {
        let url = format!("{}/api/readings/latest", self.base_url);
        self.get(&url).await
    }

    /// Store a new reading.
    pub async fn add_reading(&self, level: f64) -> Result<Reading> {
        let url = format!("{}/api/readings", self.base_url);
        self.post_json(&url, &NewReading::new(level)).await
    }

    /// Current valve position.
    pub async fn valve(&self) -> Result<ValveStatus> {
        let url = format!("{}/api/valve", self.base_url);
        self.get(&url).await
    }

    /// Open or close the valve. Closing is refused unless `confirm` is set.
    pub async fn set_valve(&self, state: ValveState, confirm: bool) -> Result<ValveStatus> {
        let url = format!("{}/api/valve", self.base_url);
        self.put_json(&url, &ValveRequest { state, confirm }).await
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ServiceClientError::NotReachable {
                    url: url.to_string(),
                    source: e,
                })?;

        self.handle_response(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            ServiceClientError::NotReachable {
                url: url.to_string(),
                source: e,
            }
        })?;

        self.handle_response(response).await
    }

    async fn put_json<T: serde::de::DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.client.put(url).json(body).send().await.map_err(|e| {
            ServiceClientError::NotReachable {
                url: url.to_string(),
                source: e,
            }
        })?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(ServiceClientError::Request)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(ServiceClientError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ServiceClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = ServiceClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_client_invalid_url() {
        let result = ServiceClient::new("localhost:5000");
        assert!(matches!(result, Err(ServiceClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_api_error_classification() {
        let err = ServiceClientError::ApiError {
            status: 400,
            message: "level is required".to_string(),
        };
        assert!(err.is_client_error());

        let err = ServiceClientError::ApiError {
            status: 500,
            message: "Database error".to_string(),
        };
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_valve_status_deserialization() {
        let json = r#"{"state": "closed", "changed_at": "2026-10-14T08:00:00Z"}"#;
        let status: ValveStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, ValveState::Closed);
        assert!(status.changed_at.is_some());

        let json = r#"{"state": "open", "changed_at": null}"#;
        let status: ValveStatus = serde_json::from_str(json).unwrap();
        assert!(status.changed_at.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Port 9 (discard) is essentially never serving HTTP.
        let client = ServiceClient::new("http://127.0.0.1:9").unwrap();
        let err = client.latest_reading().await.unwrap_err();
        assert!(matches!(err, ServiceClientError::NotReachable { .. }));
    }
}
