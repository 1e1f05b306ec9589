//! API client for the census dashboard REST backend.
//!
//! This module provides the `ApiClient` struct for logging in and fetching
//! the aggregated rural school statistics.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{
    sort_by_tablets_desc, ComputersPerStudent, Credentials, DashboardSummary, LabInternetCount,
    LanWithoutBroadband, SessionInfo, TabletWithoutLab,
};

use super::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const LOGIN_PATH: &str = "/auth/login";
const LAB_INTERNET_PATH: &str = "/dashboard/escolas-lab-internet";
const COMPUTERS_PATH: &str = "/dashboard/media-computadores";
const LAN_WITHOUT_BROADBAND_PATH: &str = "/dashboard/escolas-lan-sem-banda-larga";
const TABLETS_WITHOUT_LAB_PATH: &str = "/dashboard/escolas-tablet-sem-lab";
const SUMMARY_PATH: &str = "/dashboard/resumo-geral";

/// API client for the dashboard backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: impl Into<Arc<str>>) {
        self.token = Some(token.into());
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<Arc<str>>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            token: Some(token.into()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> ApiResult<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> ApiResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self.authorized(self.client.get(&url)).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Self::parse_json(response, &url).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    // ===== Authentication =====

    /// `POST /auth/login` - exchange credentials for a session.
    /// Not retried: a rate-limited login is reported to the user.
    pub async fn authenticate(&self, credentials: &Credentials) -> ApiResult<SessionInfo> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, email = %credentials.email, "Sending login request");

        let response = self.client.post(&url).json(credentials).send().await?;
        let response = Self::check_response(response).await?;
        let info: SessionInfo = Self::parse_json(response, &url).await?;

        if info.token.is_empty() {
            return Err(ApiError::InvalidResponse("Login response carried an empty token".to_string()));
        }
        Ok(info)
    }

    // ===== Dashboard Queries =====

    /// Rural schools with a computer lab and internet for students
    pub async fn fetch_lab_internet_count(&self) -> ApiResult<LabInternetCount> {
        self.get(LAB_INTERNET_PATH).await
    }

    /// Average desktop computers per student in rural schools with a lab
    pub async fn fetch_computers_per_student(&self) -> ApiResult<ComputersPerStudent> {
        self.get(COMPUTERS_PATH).await
    }

    /// Rural schools with a local network but no broadband
    pub async fn fetch_lan_without_broadband(&self) -> ApiResult<Vec<LanWithoutBroadband>> {
        let schools: Vec<LanWithoutBroadband> = self.get(LAN_WITHOUT_BROADBAND_PATH).await?;
        debug!(count = schools.len(), "LAN without broadband fetched");
        Ok(schools)
    }

    /// Rural schools with student tablets but no lab, most tablets first
    pub async fn fetch_tablets_without_lab(&self) -> ApiResult<Vec<TabletWithoutLab>> {
        let mut schools: Vec<TabletWithoutLab> = self.get(TABLETS_WITHOUT_LAB_PATH).await?;
        // The backend orders these, but the UI depends on it
        sort_by_tablets_desc(&mut schools);
        debug!(count = schools.len(), "Tablets without lab fetched");
        Ok(schools)
    }

    pub async fn fetch_summary(&self) -> ApiResult<DashboardSummary> {
        self.get(SUMMARY_PATH).await
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(SUMMARY_PATH), "http://localhost:8000/dashboard/resumo-geral");
    }

    #[test]
    fn test_with_token_shares_base_url() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert!(!client.has_token());

        let authed = client.with_token("abc");
        assert!(authed.has_token());
        assert_eq!(authed.base_url(), client.base_url());
    }

    #[tokio::test]
    async fn test_fetch_summary_sends_bearer_token() {
        let (base, request) = serve_once(
            200,
            r#"{"total_escolas_rurais": 18456, "escolas_com_internet": 1247, "escolas_com_laboratorio": 900, "escolas_com_tablets": 2005}"#,
        )
        .await;

        let client = ApiClient::new(&base).unwrap().with_token("jwt-123");
        let summary = client.fetch_summary().await.unwrap();
        assert_eq!(summary.total_rural_schools, 18456);
        assert_eq!(summary.with_tablets, 2005);

        let request = request.await.unwrap();
        assert!(request.head.starts_with("GET /dashboard/resumo-geral"));
        assert!(request.head.to_lowercase().contains("authorization: bearer jwt-123"));
    }

    #[tokio::test]
    async fn test_fetch_tablets_without_lab_sorted_desc() {
        let (base, _request) = serve_once(
            200,
            r#"[{"nome_escola": "A", "quantidade_tablets": 3}, {"nome_escola": "B", "quantidade_tablets": 25}, {"nome_escola": "C", "quantidade_tablets": 10}]"#,
        )
        .await;

        let client = ApiClient::new(&base).unwrap();
        let schools = client.fetch_tablets_without_lab().await.unwrap();
        let counts: Vec<u64> = schools.iter().map(|s| s.tablets).collect();
        assert_eq!(counts, vec![25, 10, 3]);
    }

    #[tokio::test]
    async fn test_authenticate_posts_credentials() {
        let (base, request) = serve_once(
            200,
            r#"{"token": "jwt", "user": {"id": "7", "name": "Ana", "email": "ana@escola.br"}}"#,
        )
        .await;

        let client = ApiClient::new(&base).unwrap();
        let info = client
            .authenticate(&Credentials::new("ana@escola.br", "segredo"))
            .await
            .unwrap();
        assert_eq!(info.token, "jwt");
        assert_eq!(info.user.id, "7");

        let request = request.await.unwrap();
        assert!(request.head.starts_with("POST /auth/login"));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["email"], "ana@escola.br");
        assert_eq!(body["password"], "segredo");
    }

    #[tokio::test]
    async fn test_authenticate_unauthorized() {
        let (base, _request) = serve_once(401, r#"{"detail": "invalid"}"#).await;

        let client = ApiClient::new(&base).unwrap();
        let err = client
            .authenticate(&Credentials::new("ana@escola.br", "errada"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let (base, _request) = serve_once(200, r#"{"unexpected": true}"#).await;

        let client = ApiClient::new(&base).unwrap();
        let err = client.fetch_lab_internet_count().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(m) if m.contains("escolas-lab-internet")));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (base, _request) = serve_once(503, "unavailable").await;

        let client = ApiClient::new(&base).unwrap();
        let err = client.fetch_computers_per_student().await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(b) if b == "unavailable"));
    }
}
