//! Session Manager - stateless encrypted session handling
//!
//! The session lives entirely in the `session` cookie. Reading it back goes
//! through the [`CredentialCodec`], so a missing cookie and a forged, corrupted or
//! expired one look exactly the same to callers: no session.

use actix_web::{HttpRequest, HttpResponse};

use crate::error::{GreenlightError, Result};
use crate::models::UserData;
use crate::session::codec::{CredentialCodec, SessionKeys};
use crate::session::cookie::{CookieFactory, CookieOptions, SESSION_COOKIE};
use crate::settings::GreenlightSettings;

// =============================================================================
// Session Manager Structure
// =============================================================================

#[derive(Clone, Debug)]
pub struct SessionManager {
    codec: CredentialCodec,
    cookie_factory: CookieFactory,
    session_max_age_hours: u64,
}

// =============================================================================
// 1. Construction
// =============================================================================

impl SessionManager {
    /// Create a session manager around a key pair
    ///
    /// The credential's embedded max age and the cookie's `Max-Age` both follow
    /// `session_max_age_hours`. Zero means a browser-session cookie whose
    /// credential never expires.
    #[must_use]
    pub fn new(keys: SessionKeys, cookie_secure: bool, session_max_age_hours: u64) -> Self {
        let max_age_seconds = i64::try_from(session_max_age_hours.saturating_mul(3600))
            .unwrap_or(i64::MAX);
        Self {
            codec: CredentialCodec::new(keys, max_age_seconds),
            cookie_factory: CookieFactory::new(cookie_secure),
            session_max_age_hours,
        }
    }

    /// Build from loaded settings, generating keys when none are configured
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configured keys are unusable
    pub fn from_settings(settings: &GreenlightSettings) -> Result<Self> {
        let keys =
            SessionKeys::load_or_generate(&settings.session.hash_key, &settings.session.block_key)?;
        Ok(Self::new(
            keys,
            settings.cookies.secure,
            settings.session.max_age_hours,
        ))
    }
}

// =============================================================================
// 2. Session Extraction
// =============================================================================

impl SessionManager {
    /// Read the logged-in user from the request's session cookie
    ///
    /// Returns `None` when the cookie is absent or cannot be decoded.
    #[must_use]
    pub fn get_user_data(&self, req: &HttpRequest) -> Option<UserData> {
        let cookie = req.cookie(SESSION_COOKIE)?;
        match self.codec.decode::<UserData>(SESSION_COOKIE, cookie.value()) {
            Ok(user) => Some(user),
            Err(e) => {
                log::debug!("Ignoring session cookie: {e}");
                None
            }
        }
    }
}

// =============================================================================
// 3. Response Creation
// =============================================================================

impl SessionManager {
    /// Encode `user` into a session cookie
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the credential cannot be produced
    pub fn create_session_cookie(
        &self,
        user: &UserData,
    ) -> Result<actix_web::cookie::Cookie<'static>> {
        let value = self.codec.encode(SESSION_COOKIE, user)?;
        let max_age = self.codec.max_age_seconds();
        Ok(self.cookie_factory.create_cookie(
            SESSION_COOKIE,
            value,
            CookieOptions {
                max_age: (max_age > 0)
                    .then(|| actix_web::cookie::time::Duration::seconds(max_age)),
                ..Default::default()
            },
        ))
    }

    /// Attach a session cookie for `user` to `response`
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the credential cannot be produced or the cookie
    /// cannot be attached
    pub fn set_user_data(&self, user: &UserData, response: &mut HttpResponse) -> Result<()> {
        let cookie = self.create_session_cookie(user)?;
        response
            .add_cookie(&cookie)
            .map_err(|e| GreenlightError::Encoding(e.to_string()))
    }

    /// An empty, already expired `session` cookie
    #[must_use]
    pub fn create_expired_cookie(&self) -> actix_web::cookie::Cookie<'static> {
        self.cookie_factory.create_expired_cookie(SESSION_COOKIE, "/")
    }

    /// Attach a session-clearing cookie to `response`
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie cannot be attached to the response
    pub fn clear_user_data(&self, response: &mut HttpResponse) -> Result<()> {
        response
            .add_cookie(&self.create_expired_cookie())
            .map_err(|e| GreenlightError::Encoding(e.to_string()))
    }
}

// =============================================================================
// 4. Utilities
// =============================================================================

impl SessionManager {
    #[must_use]
    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    #[must_use]
    pub fn cookie_factory(&self) -> CookieFactory {
        self.cookie_factory
    }

    #[must_use]
    pub fn session_max_age_hours(&self) -> u64 {
        self.session_max_age_hours
    }
}

// =============================================================================
// 5. Tests
// =============================================================================
