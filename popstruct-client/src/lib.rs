//! PopStruct HTTP Client
//!
//! A typed HTTP client for the PopStruct analysis backend (`/api/v1`).
//!
//! Every authenticated call goes through one request layer that attaches the
//! bearer token from the injected [`SessionProvider`] and, on a 401, performs
//! at most one token refresh before retrying the request once.
//!
//! # Example
//!
//! ```no_run
//! use popstruct_client::{ApiClient, MemorySession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:8000", Arc::new(MemorySession::new()));
//!
//!     client.login("ana@example.org", "hunter22").await?;
//!     let job = client.get_job(42).await?;
//!
//!     println!("Job {} is {}", job.id, job.status);
//!     Ok(())
//! }
//! ```

mod analysis;
mod auth;
mod datasets;
pub mod error;
mod jobs;
mod results;
pub mod session;
mod subscription;

// Re-export commonly used types
pub use error::{ClientError, ErrorKind, Result};
pub use session::{FileSession, MemorySession, Session, SessionProvider};

use popstruct_core::dto::auth::{RefreshRequest, TokenPair};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Path prefix of every backend route
pub const API_PREFIX: &str = "/api/v1";

/// HTTP client for the PopStruct API
///
/// Cheap to clone; clones share the session and the refresh lock. Methods are
/// organized into logical groups:
/// - Authentication (login, signup, refresh, current user)
/// - Datasets (list, get, upload, delete)
/// - Jobs and analysis submission
/// - Result preview and archive download
/// - Subscription and payment
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Token storage
    session: Arc<dyn SessionProvider>,
    /// Serializes token refreshes across concurrent requests
    refresh_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend (e.g., "http://localhost:8000")
    /// * `session` - Where tokens are read from and written to
    ///
    /// # Example
    /// ```
    /// use popstruct_client::{ApiClient, MemorySession};
    /// use std::sync::Arc;
    ///
    /// let client = ApiClient::new("http://localhost:8000", Arc::new(MemorySession::new()));
    /// ```
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(base_url, Client::new(), session)
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use popstruct_client::{ApiClient, MemorySession};
    /// use reqwest::Client;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ApiClient::with_client(
    ///     "http://localhost:8000",
    ///     http_client,
    ///     Arc::new(MemorySession::new()),
    /// );
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        client: Client,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session storage used by this client
    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    /// Whether a session is stored
    pub fn is_authenticated(&self) -> bool {
        self.session.get().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    // =============================================================================
    // Authenticated Request Layer
    // =============================================================================

    /// Send a request with the current access token
    ///
    /// `build` is invoked again for the retry, so it must produce an
    /// equivalent request each time. A 401 triggers one refresh and one retry;
    /// a second 401 clears the session.
    async fn send_authorized<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.session.get().map(|s| s.access_token);
        let response = with_bearer(build(&self.client), token.as_deref())
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Access token rejected, refreshing session");
        self.refresh_session(token.as_deref()).await?;

        let token = self.session.get().map(|s| s.access_token);
        let response = with_bearer(build(&self.client), token.as_deref())
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Request still unauthorized after refresh, clearing session");
            self.session.clear()?;
            return Err(ClientError::AuthExpired(
                "Session expired, please log in again".to_string(),
            ));
        }

        Ok(response)
    }

    /// Exchange the refresh token for a new pair
    ///
    /// `rejected_token` is the access token the server just refused. When the
    /// stored token differs, another request already refreshed and this one
    /// simply retries with the new token.
    async fn refresh_session(&self, rejected_token: Option<&str>) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        let current = self
            .session
            .get()
            .ok_or_else(|| ClientError::AuthExpired("Not logged in".to_string()))?;

        if rejected_token.is_some_and(|t| t != current.access_token) {
            debug!("Session already refreshed by a concurrent request");
            return Ok(());
        }

        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest {
                refresh_token: current.refresh_token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "Token refresh rejected with status {}, clearing session",
                response.status()
            );
            self.session.clear()?;
            return Err(ClientError::AuthExpired(
                "Session expired, please log in again".to_string(),
            ));
        }

        let tokens: TokenPair = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse token pair: {}", e)))?;
        self.session.set(Session::from(tokens))?;

        debug!("Session refreshed");
        Ok(())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await?;
        Ok(())
    }

    /// Handle an API response carrying a binary body
    async fn handle_bytes_response(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let response = self.check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        Ok(response)
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Arc::new(MemorySession::new()))
    }

    #[test]
    fn test_client_creation() {
        let client = client("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = client("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/jobs/42"), "http://localhost:8000/api/v1/jobs/42");
    }

    #[test]
    fn test_client_with_custom_client() {
        let session = Arc::new(MemorySession::with_session(Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        }));
        let client = ApiClient::with_client("http://localhost:8000", Client::new(), session);
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert!(client.is_authenticated());
    }
}
