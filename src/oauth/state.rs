//! One-time anti-forgery state tokens
//!
//! A fresh token is issued when a login starts and stored in the `oauthstate`
//! cookie. The provider echoes it back in the callback's `state` parameter and the
//! two must match. Every callback response expires the cookie again.

use actix_web::cookie::{time::Duration, Cookie};
use actix_web::HttpRequest;

use crate::session::cookie::{CookieFactory, CookieOptions};
use crate::utils::crypto::{constant_time_eq, generate_state_token};

pub const OAUTH_STATE_COOKIE: &str = "oauthstate";

/// How long a started login may wait for its callback
pub const STATE_LIFETIME_MINUTES: i64 = 20;

#[derive(Clone, Copy, Debug)]
pub struct StateManager {
    cookie_factory: CookieFactory,
}

impl StateManager {
    #[must_use]
    pub fn new(cookie_factory: CookieFactory) -> Self {
        Self { cookie_factory }
    }

    /// Issue a new state token and the cookie that carries it
    #[must_use]
    pub fn issue_state(&self) -> (String, Cookie<'static>) {
        let token = generate_state_token();
        let cookie = self.cookie_factory.create_cookie(
            OAUTH_STATE_COOKIE,
            token.clone(),
            CookieOptions {
                max_age: Some(Duration::minutes(STATE_LIFETIME_MINUTES)),
                ..Default::default()
            },
        );
        (token, cookie)
    }

    /// Cookie that discards the state token in the browser
    #[must_use]
    pub fn expired_state_cookie(&self) -> Cookie<'static> {
        self.cookie_factory
            .create_expired_cookie(OAUTH_STATE_COOKIE, "/")
    }

    /// The state token stored in the request's cookie, if any
    #[must_use]
    pub fn state_from_request(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(OAUTH_STATE_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}

/// `true` only when both values are present, non-empty and identical
#[must_use]
pub fn validate_state(cookie_value: Option<&str>, callback_value: Option<&str>) -> bool {
    match (cookie_value, callback_value) {
        (Some(stored), Some(received)) if !stored.is_empty() && !received.is_empty() => {
            constant_time_eq(stored.as_bytes(), received.as_bytes())
        }
        _ => false,
    }
}
