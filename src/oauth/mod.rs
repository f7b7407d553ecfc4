//! OAuth2 authorization-code flow building blocks
//!
//! Provider adapters, the anti-forgery state token, and the shapes shared by
//! token and callback handling.

pub mod github;
pub mod google;
pub mod provider;
pub mod state;

pub use github::GitHubProvider;
pub use google::GoogleProvider;
pub use provider::{IdentityProvider, ProviderConfig, ProviderEndpoints};
pub use state::{validate_state, StateManager, OAUTH_STATE_COOKIE};

use serde::Deserialize;

use crate::error::{GreenlightError, Result};

/// Query parameters the provider sends back to the callback route
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Token endpoint response, success or error shaped
#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_access_token(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(GreenlightError::TokenExchange(match self.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            }));
        }
        self.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                GreenlightError::TokenExchange("response has no access_token".to_string())
            })
    }
}
