//! Authentication endpoints

use popstruct_core::domain::user::User;
use popstruct_core::dto::auth::{LoginRequest, SignupRequest, TokenPair};
use tracing::info;

use crate::ApiClient;
use crate::error::Result;
use crate::session::Session;

impl ApiClient {
    // =============================================================================
    // Session Lifecycle
    // =============================================================================

    /// Log in and store the issued tokens
    ///
    /// # Example
    /// ```no_run
    /// # use popstruct_client::{ApiClient, MemorySession};
    /// # use std::sync::Arc;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ApiClient::new("http://localhost:8000", Arc::new(MemorySession::new()));
    /// client.login("ana@example.org", "hunter22").await?;
    /// let me = client.me().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let tokens: TokenPair = self.handle_response(response).await?;
        self.session.set(Session::from(tokens.clone()))?;

        info!("Logged in as {}", email);
        Ok(tokens)
    }

    /// Create an account and store the issued tokens
    ///
    /// # Arguments
    /// * `email` - Account email
    /// * `password` - Account password
    /// * `full_name` - Optional display name
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<TokenPair> {
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(&SignupRequest {
                email: email.to_string(),
                password: password.to_string(),
                full_name: full_name.map(str::to_string),
            })
            .send()
            .await?;

        let tokens: TokenPair = self.handle_response(response).await?;
        self.session.set(Session::from(tokens.clone()))?;

        info!("Signed up as {}", email);
        Ok(tokens)
    }

    /// Get the authenticated user
    pub async fn me(&self) -> Result<User> {
        let url = self.url("/auth/me");
        let response = self.send_authorized(|c| c.get(&url)).await?;

        self.handle_response(response).await
    }

    /// Forget the stored tokens
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }
}
