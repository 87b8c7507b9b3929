//! Bus provider HTTP client.
//!
//! Provides async methods for the three provider endpoints. Handles
//! concurrency limiting, HTTP status mapping and the provider's own
//! `errorCode` envelope.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

use super::error::BusApiError;
use super::types::RawResponse;

/// Default base URL of the provider.
const DEFAULT_BASE_URL: &str = "http://m.bus.go.kr/mBus/bus";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the bus provider client.
#[derive(Debug, Clone, PartialEq)]
pub struct BusApiConfig {
    /// Base URL for the API (defaults to the production provider)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BusApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for BusApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Bus provider API client.
///
/// Uses a semaphore to limit concurrent requests; the provider throttles
/// aggressive clients.
#[derive(Debug, Clone)]
pub struct BusApiClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl BusApiClient {
    pub fn new(config: BusApiConfig) -> Result<Self, BusApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Stops within `radius_m` metres of a point (`getStationByPos.bms`).
    pub async fn stations_by_position(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<RawResponse, BusApiError> {
        self.post(
            "getStationByPos.bms",
            &[
                ("tmX", longitude.to_string()),
                ("tmY", latitude.to_string()),
                ("radius", radius_m.to_string()),
            ],
        )
        .await
    }

    /// Ordered stops of a route (`getRouteAndPos.bms`).
    pub async fn route_and_positions(&self, route_id: i64) -> Result<RawResponse, BusApiError> {
        self.post("getRouteAndPos.bms", &[("busRouteId", route_id.to_string())])
            .await
    }

    /// Routes serving a stop, by its public code (`getStationByUid.bms`).
    pub async fn station_by_uid(&self, ars_id: &str) -> Result<RawResponse, BusApiError> {
        self.post("getStationByUid.bms", &[("arsId", ars_id.to_string())])
            .await
    }

    async fn post(
        &self,
        endpoint: &str,
        form: &[(&str, String)],
    ) -> Result<RawResponse, BusApiError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BusApiError::Status {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?form, "Requesting upstream");

        let response = self.http.post(&url).form(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BusApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;

        let parsed: RawResponse = serde_json::from_str(&body).map_err(|e| BusApiError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        if let Some(status) = parsed.error.as_ref().filter(|s| !s.is_success()) {
            return Err(BusApiError::Api {
                code: status.code.clone(),
                message: status.message.clone(),
            });
        }

        Ok(parsed)
    }
}

/// Format a public stop code the way the provider expects (five digits,
/// zero padded).
///
/// # Examples
///
/// ```
/// use bus_server::bus_api::format_ars_id;
///
/// assert_eq!(format_ars_id(1003), "01003");
/// assert_eq!(format_ars_id(47171), "47171");
/// ```
pub fn format_ars_id(number: u32) -> String {
    format!("{number:05}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::json;

    /// Serve a fake provider on an ephemeral port and return its base URL.
    async fn fake_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> BusApiClient {
        BusApiClient::new(BusApiConfig::new().with_base_url(base_url)).unwrap()
    }

    #[test]
    fn config_builder() {
        let config = BusApiConfig::new()
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = BusApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        assert!(BusApiClient::new(BusApiConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn posts_form_and_parses_envelope() {
        let router = Router::new().route(
            "/getStationByUid.bms",
            post(|body: String| async move {
                assert_eq!(body, "arsId=47105");
                axum::Json(json!({
                    "error": {"errorCode": "0000", "errorMessage": "성공"},
                    "resultList": [{"busRouteId": "4940100", "rtNm": "9401"}]
                }))
            }),
        );
        let base = fake_upstream(router).await;

        let resp = client(&base).station_by_uid("47105").await.unwrap();
        assert_eq!(resp.records().len(), 1);
        assert_eq!(resp.records()[0]["rtNm"], "9401");
    }

    #[tokio::test]
    async fn upstream_error_code_is_an_error() {
        let router = Router::new().route(
            "/getRouteAndPos.bms",
            post(|| async {
                axum::Json(json!({
                    "error": {"errorCode": "8", "errorMessage": "요청 제한 초과"},
                    "resultList": null
                }))
            }),
        );
        let base = fake_upstream(router).await;

        let err = client(&base).route_and_positions(1).await.unwrap_err();
        assert!(matches!(err, BusApiError::Api { ref code, .. } if code == "8"));
    }

    #[tokio::test]
    async fn http_status_is_mapped() {
        let router = Router::new().route(
            "/getStationByPos.bms",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = fake_upstream(router).await;

        let err = client(&base)
            .stations_by_position(37.5, 127.0, 300)
            .await
            .unwrap_err();
        assert!(matches!(err, BusApiError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn invalid_json_keeps_body_excerpt() {
        let router = Router::new().route(
            "/getStationByPos.bms",
            post(|| async { "<html>maintenance</html>" }),
        );
        let base = fake_upstream(router).await;

        let err = client(&base)
            .stations_by_position(37.5, 127.0, 300)
            .await
            .unwrap_err();
        match err {
            BusApiError::Json { body, .. } => {
                assert_eq!(body.as_deref(), Some("<html>maintenance</html>"))
            }
            other => panic!("expected Json error, got {other:?}"),
        }
    }
}
