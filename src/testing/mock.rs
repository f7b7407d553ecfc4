//! Scripted identity provider for flow tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::error::{GreenlightError, Result};
use crate::models::UserData;
use crate::oauth::IdentityProvider;

use super::constants::STUB_ACCESS_TOKEN;
use super::fixtures::TestFixtures;

/// Provider whose token exchange and profile fetch return canned results
///
/// Counts every outbound call so tests can assert that a flow stopped before
/// reaching the provider.
pub struct StubProvider {
    name: String,
    access_token: Option<String>,
    profile: Option<UserData>,
    calls: AtomicUsize,
    last_code: Mutex<Option<String>>,
}

impl StubProvider {
    /// A provider that succeeds with [`TestFixtures::user_data`]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access_token: Some(STUB_ACCESS_TOKEN.to_string()),
            profile: Some(TestFixtures::user_data(name)),
            calls: AtomicUsize::new(0),
            last_code: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: UserData) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// Make the token exchange fail
    #[must_use]
    pub fn failing_exchange(mut self) -> Self {
        self.access_token = None;
        self
    }

    /// Make the profile fetch fail
    #[must_use]
    pub fn failing_profile(mut self) -> Self {
        self.profile = None;
        self
    }

    /// Number of token exchange and profile fetch calls so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Authorization code received by the most recent exchange
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.last_code.lock().ok().and_then(|code| code.clone())
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse("https://provider.example/authorize")
            .map_err(|e| GreenlightError::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", "stub")
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last_code) = self.last_code.lock() {
            *last_code = Some(code.to_string());
        }
        self.access_token
            .clone()
            .ok_or_else(|| GreenlightError::TokenExchange("stub exchange failure".to_string()))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.access_token.as_deref() != Some(access_token) {
            return Err(GreenlightError::ProfileFetch("unknown access token".to_string()));
        }
        self.profile
            .clone()
            .ok_or_else(|| GreenlightError::ProfileFetch("stub profile failure".to_string()))
    }
}
