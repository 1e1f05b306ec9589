use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::api::ApiClient;
use crate::models::{Credentials, SessionInfo, User};

use super::AuthError;

/// Verifies credentials and issues a session.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionInfo, AuthError>;

    /// Short name for logs and the status bar
    fn name(&self) -> &'static str;
}

/// Accepts any credentials after a fixed artificial delay.
///
/// The user's id is always `"1"` and the display name is the local part of
/// the email address.
pub struct MockAuthBackend {
    delay: Duration,
}

impl MockAuthBackend {
    /// Stand-in for a network round-trip
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(800);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No artificial delay
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionInfo, AuthError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let token = format!("mock-jwt-token-{}", Utc::now().timestamp_millis());
        debug!(email = %credentials.email, "Issuing mock session");

        Ok(SessionInfo {
            token,
            user: User::from_email("1", &credentials.email),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Authenticates against `POST /auth/login` on the dashboard backend.
pub struct HttpAuthBackend {
    api: ApiClient,
}

impl HttpAuthBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionInfo, AuthError> {
        Ok(self.api.authenticate(credentials).await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_server::serve_once;

    #[tokio::test]
    async fn test_mock_backend_accepts_anything() {
        let backend = MockAuthBackend::instant();
        let info = backend
            .authenticate(&Credentials::new("teacher@school.br", "whatever"))
            .await
            .unwrap();

        assert!(info.token.starts_with("mock-jwt-token-"));
        assert_eq!(info.user.id, "1");
        assert_eq!(info.user.name, "teacher");
        assert_eq!(info.user.email, "teacher@school.br");
    }

    #[tokio::test]
    async fn test_mock_backend_waits_for_delay() {
        let backend = MockAuthBackend::new(Duration::from_millis(20));
        let started = std::time::Instant::now();
        backend.authenticate(&Credentials::new("a@b.c", "x")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_mock_backend_default_delay() {
        assert_eq!(MockAuthBackend::default().delay, Duration::from_millis(800));
    }

    #[tokio::test]
    async fn test_http_backend_maps_unauthorized() {
        let (base, _request) = serve_once(401, "").await;
        let backend = HttpAuthBackend::new(ApiClient::new(&base).unwrap());

        let err = backend
            .authenticate(&Credentials::new("a@b.c", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_http_backend_returns_session() {
        let (base, _request) = serve_once(
            200,
            r#"{"token": "real-jwt", "user": {"id": "9", "name": "Maria Silva", "email": "maria@escola.br"}}"#,
        )
        .await;
        let backend = HttpAuthBackend::new(ApiClient::new(&base).unwrap());

        let info = backend
            .authenticate(&Credentials::new("maria@escola.br", "ok"))
            .await
            .unwrap();
        // The backend's display name wins over the email local part
        assert_eq!(info.user.name, "Maria Silva");
        assert_eq!(info.token, "real-jwt");
    }

    #[tokio::test]
    async fn test_http_backend_unreachable() {
        // Reserve a port, then free it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpAuthBackend::new(ApiClient::new(&format!("http://{}", addr)).unwrap());
        let err = backend
            .authenticate(&Credentials::new("a@b.c", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NetworkUnavailable(_)));
    }
}
