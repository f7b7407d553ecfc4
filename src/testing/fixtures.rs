//! Test fixtures providing pre-built test objects

use actix_web::cookie::Cookie;

use crate::auth::{Greenlight, RedirectOnLogin};
use crate::models::UserData;
use crate::oauth::OAUTH_STATE_COOKIE;
use crate::session::{SessionKeys, SessionManager, SESSION_COOKIE};

use super::constants::{TEST_BASE_URL, TEST_EMAIL, TEST_MOUNT_PATH, TEST_USER_NAME};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// A complete identity for `provider`
    #[must_use]
    pub fn user_data(provider: &str) -> UserData {
        UserData::new(provider, TEST_EMAIL)
            .with_name(TEST_USER_NAME)
            .with_avatar("https://avatars.example/ada.png")
            .with_url("https://example.com/ada")
    }

    /// Session manager with fresh keys, insecure cookies and a 24 hour lifetime
    #[must_use]
    pub fn session_manager() -> SessionManager {
        SessionManager::new(SessionKeys::generate(), false, 24)
    }

    /// Orchestrator mounted at the test mount path with no providers
    #[must_use]
    pub fn greenlight() -> Greenlight {
        Self::greenlight_with(Self::session_manager())
    }

    /// Orchestrator around an existing session manager
    #[must_use]
    pub fn greenlight_with(session_manager: SessionManager) -> Greenlight {
        Greenlight::new(
            session_manager,
            TEST_BASE_URL,
            TEST_MOUNT_PATH,
            RedirectOnLogin::default(),
        )
    }

    /// An `oauthstate` cookie carrying `state`
    #[must_use]
    pub fn state_cookie(state: &str) -> Cookie<'static> {
        Cookie::new(OAUTH_STATE_COOKIE, state.to_string())
    }

    /// A `session` cookie carrying an arbitrary raw value
    #[must_use]
    pub fn raw_session_cookie(value: &str) -> Cookie<'static> {
        Cookie::new(SESSION_COOKIE, value.to_string())
    }
}
