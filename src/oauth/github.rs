//! GitHub OAuth2 adapter

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GreenlightError, Result};
use crate::models::UserData;
use crate::oauth::provider::{
    build_authorization_url, http_client, IdentityProvider, ProviderConfig, ProviderEndpoints,
};
use crate::oauth::TokenResponse;
use crate::utils::LoggingHelper;

pub const GITHUB_PROVIDER: &str = "github";

const AUTHORIZATION_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
const USERINFO_ENDPOINT: &str = "https://api.github.com/user";
const GITHUB_API_ACCEPT: &str = "application/vnd.github+json";

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: Option<String>,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

pub struct GitHubProvider {
    config: ProviderConfig,
    emails_url: String,
    client: reqwest::Client,
}

impl GitHubProvider {
    /// Configuration against github.com with the `user:email` scope
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
            GITHUB_PROVIDER,
            client_id,
            client_secret,
            ProviderEndpoints {
                authorization: AUTHORIZATION_ENDPOINT.to_string(),
                token: TOKEN_ENDPOINT.to_string(),
                userinfo: USERINFO_ENDPOINT.to_string(),
            },
            redirect_url,
        )?
        .with_scopes(&["user:email"]))
    }

    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        let emails_url = format!("{}/emails", config.endpoints.userinfo.trim_end_matches('/'));
        Ok(Self {
            config,
            emails_url,
            client,
        })
    }

    /// Primary verified address for accounts whose profile email is private
    async fn fetch_primary_email(&self, access_token: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.emails_url)
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_API_ACCEPT)
            .send()
            .await
            .map_err(|e| GreenlightError::ProfileFetch(format!("emails request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GreenlightError::ProfileFetch(format!(
                "emails endpoint returned {status}"
            )));
        }

        let emails: Vec<GitHubEmail> = response
            .json()
            .await
            .map_err(|e| GreenlightError::ProfileFetch(format!("malformed emails response: {e}")))?;

        emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email)
            .ok_or_else(|| {
                GreenlightError::ProfileFetch("no primary verified email address".to_string())
            })
    }
}

#[async_trait]
impl IdentityProvider for GitHubProvider {
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
            .header(ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.config.client_id,
                client_secret: self.config.client_secret(),
                code,
                redirect_uri: &self.config.redirect_url,
            })
            .send()
            .await
            .map_err(|e| GreenlightError::TokenExchange(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GreenlightError::TokenExchange(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            GreenlightError::TokenExchange(format!("malformed token response: {e}"))
        })?;
        body.into_access_token()
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserData> {
        let response = self
            .client
            .get(&self.config.endpoints.userinfo)
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_API_ACCEPT)
            .send()
            .await
            .map_err(|e| GreenlightError::ProfileFetch(format!("user request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GreenlightError::ProfileFetch(format!(
                "user endpoint returned {status}"
            )));
        }

        let user: GitHubUser = response
            .json()
            .await
            .map_err(|e| GreenlightError::ProfileFetch(format!("malformed user response: {e}")))?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => self.fetch_primary_email(access_token).await?,
        };

        let name = user
            .name
            .filter(|n| !n.is_empty())
            .or(user.login)
            .unwrap_or_default();

        Ok(UserData::new(self.name(), email)
            .with_name(name)
            .with_avatar(user.avatar_url.unwrap_or_default())
            .with_url(user.html_url.unwrap_or_default()))
    }
}
