//! Google OAuth2 adapter

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GreenlightError, Result};
use crate::models::UserData;
use crate::oauth::provider::{
    build_authorization_url, http_client, IdentityProvider, ProviderConfig, ProviderEndpoints,
};
use crate::oauth::TokenResponse;
use crate::utils::LoggingHelper;

pub const GOOGLE_PROVIDER: &str = "google";

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Client credentials file as downloaded from the Google Cloud console
#[derive(Deserialize)]
struct CredentialsFile {
    web: Option<ClientCredentials>,
    installed: Option<ClientCredentials>,
}

#[derive(Deserialize)]
struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct GoogleUser {
    email: String,
    verified_email: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

pub struct GoogleProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Configuration against Google's endpoints with the email scope
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the id, secret or redirect URL is missing
    pub fn config(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Result<ProviderConfig> {
        Ok(ProviderConfig::new(
            GOOGLE_PROVIDER,
            client_id,
            client_secret,
            ProviderEndpoints {
                authorization: AUTHORIZATION_ENDPOINT.to_string(),
                token: TOKEN_ENDPOINT.to_string(),
                userinfo: USERINFO_ENDPOINT.to_string(),
            },
            redirect_url,
        )?
        .with_scopes(&[EMAIL_SCOPE]))
    }

    /// Configuration read from a client credentials JSON file
    ///
    /// Accepts both the `web` and `installed` application layouts.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed, or if it
    /// carries no client credentials
    pub fn config_from_credentials_file(
        path: impl AsRef<Path>,
        redirect_url: impl Into<String>,
    ) -> Result<ProviderConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GreenlightError::Configuration(format!(
                "Failed to read Google credentials file {}: {e}",
                path.display()
            ))
        })?;
        let file: CredentialsFile = serde_json::from_str(&content).map_err(|e| {
            GreenlightError::Configuration(format!(
                "Failed to parse Google credentials file {}: {e}",
                path.display()
            ))
        })?;

        let credentials = file.web.or(file.installed).ok_or_else(|| {
            GreenlightError::Configuration(format!(
                "Google credentials file {} has no client credentials",
                path.display()
            ))
        })?;

        Self::config(
            credentials.client_id,
            credentials.client_secret,
            redirect_url,
        )
    }

    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn authorization_url(&self, state: &str) -> Result<Url> {
        build_authorization_url(&self.config, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        LoggingHelper::log_token_exchange_start(self.name());

        let response = self
            .client
            .post(&self.config.endpoints.token)
            .form(&TokenRequest {
                grant_type: "authorization_code",
                code,
                client_id: &self.config.client_id,
                client_secret: self.config.client_secret(),
                redirect_uri: &self.config.redirect_url,
            })
            .send()
            .await
            .map_err(|e| GreenlightError::TokenExchange(format!("token request failed: {e}")))?;

        // Google reports bad codes as 400 with a JSON error body
        let status = response.status();
        let body: TokenResponse = response.json().await.map_err(|e| {
            GreenlightError::TokenExchange(format!(
                "malformed token response ({status}): {e}"
            ))
        })?;
        if !status.is_success() && body.error.is_none() {
            return Err(GreenlightError::TokenExchange(format!(
                "token endpoint returned {status}"
            )));
        }
        body.into_access_token()
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserData> {
        let response = self
            .client
            .get(&self.config.endpoints.userinfo)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GreenlightError::ProfileFetch(format!("userinfo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GreenlightError::ProfileFetch(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let user: GoogleUser = response.json().await.map_err(|e| {
            GreenlightError::ProfileFetch(format!("malformed userinfo response: {e}"))
        })?;

        if user.verified_email == Some(false) {
            return Err(GreenlightError::ProfileFetch(
                "email address is not verified".to_string(),
            ));
        }

        Ok(UserData::new(self.name(), user.email)
            .with_name(user.name.unwrap_or_default())
            .with_avatar(user.picture.unwrap_or_default()))
    }
}
