//! Identity provider contract and shared adapter configuration

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{GreenlightError, Result};
use crate::models::UserData;

/// Default bound on every outbound provider call
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("greenlight/", env!("CARGO_PKG_VERSION"));

/// An OAuth2 identity provider
///
/// Implementations own their configuration and are shared read-only between
/// requests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registered name, used as the route namespace and as `UserData::provider`
    fn name(&self) -> &str;

    /// Build the URL the browser is sent to, embedding the anti-forgery `state`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the authorization endpoint is not a valid URL
    fn authorization_url(&self, state: &str) -> Result<Url>;

    /// Exchange an authorization code for an access token
    ///
    /// # Errors
    ///
    /// Returns [`GreenlightError::TokenExchange`] on network failure, timeout,
    /// non-success status, a provider error body, or a missing access token
    async fn exchange_code(&self, code: &str) -> Result<String>;

    /// Fetch and normalize the user's profile
    ///
    /// # Errors
    ///
    /// Returns [`GreenlightError::ProfileFetch`] when the call fails or required
    /// fields are missing
    async fn fetch_profile(&self, access_token: &str) -> Result<UserData>;
}

/// Provider endpoint URLs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorization: String,
    pub token: String,
    pub userinfo: String,
}

/// Immutable configuration owned by one adapter
#[derive(Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub client_id: String,
    client_secret: String,
    pub endpoints: ProviderEndpoints,
    pub scopes: Vec<String>,
    pub redirect_url: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a provider configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name, client id, client secret or
    /// redirect URL is empty, or if the redirect URL does not parse
    pub fn new(
        name: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoints: ProviderEndpoints,
        redirect_url: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            name: name.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            endpoints,
            scopes: Vec::new(),
            redirect_url: redirect_url.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        };

        if config.name.is_empty() {
            return Err(GreenlightError::Configuration(
                "Provider name must not be empty".to_string(),
            ));
        }
        if config.client_id.trim().is_empty() {
            return Err(GreenlightError::Configuration(format!(
                "Missing client id for provider {}",
                config.name
            )));
        }
        if config.client_secret.trim().is_empty() {
            return Err(GreenlightError::Configuration(format!(
                "Missing client secret for provider {}",
                config.name
            )));
        }
        Url::parse(&config.redirect_url).map_err(|e| {
            GreenlightError::Configuration(format!(
                "Invalid redirect URL for provider {}: {e}",
                config.name
            ))
        })?;

        Ok(config)
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("endpoints", &self.endpoints)
            .field("scopes", &self.scopes)
            .field("redirect_url", &self.redirect_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Standard authorization-code URL for `config`
///
/// # Errors
///
/// Returns a configuration error if the authorization endpoint does not parse
pub fn build_authorization_url(config: &ProviderConfig, state: &str) -> Result<Url> {
    let mut url = Url::parse(&config.endpoints.authorization).map_err(|e| {
        GreenlightError::Configuration(format!(
            "Invalid authorization endpoint for {}: {e}",
            config.name
        ))
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_url)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scopes.join(" "))
        .append_pair("state", state);

    Ok(url)
}

/// HTTP client used for token and profile calls
///
/// # Errors
///
/// Returns a configuration error if the client cannot be built
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| GreenlightError::Configuration(format!("Failed to build HTTP client: {e}")))
}
