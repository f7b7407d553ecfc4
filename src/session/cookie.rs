use actix_web::cookie::{time::Duration, Cookie, SameSite};

/// Cookie carrying the encoded session credential
pub const SESSION_COOKIE: &str = "session";

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    /// `None` produces a browser-session cookie
    pub max_age: Option<Duration>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: Some(Duration::hours(24)),
        }
    }
}

/// Cookie factory shared by the session and anti-forgery cookies
///
/// Every cookie it builds is `HttpOnly` and `SameSite=Lax`. The `Secure` flag
/// follows configuration so the demo can run over plain HTTP on localhost.
#[derive(Clone, Copy, Debug)]
pub struct CookieFactory {
    cookie_secure: bool,
}

impl CookieFactory {
    #[must_use]
    pub fn new(cookie_secure: bool) -> Self {
        Self { cookie_secure }
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Build a cookie holding an already encoded value
    #[must_use]
    pub fn create_cookie(&self, name: &str, value: String, options: CookieOptions) -> Cookie<'static> {
        let mut builder = Cookie::build(name.to_owned(), value)
            .http_only(options.http_only)
            .secure(self.cookie_secure)
            .same_site(options.same_site)
            .path(options.path);
        if let Some(max_age) = options.max_age {
            builder = builder.max_age(max_age);
        }
        builder.finish()
    }

    /// Create an expired cookie that instructs the browser to drop `name` at `path`
    #[must_use]
    pub fn create_expired_cookie(&self, name: &str, path: &str) -> Cookie<'static> {
        self.create_cookie(
            name,
            String::new(),
            CookieOptions {
                path: path.to_owned(),
                max_age: Some(Duration::seconds(-1)),
                ..Default::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cookie_attributes() {
        let factory = CookieFactory::new(true);
        let cookie = factory.create_cookie(
            SESSION_COOKIE,
            "value".to_string(),
            CookieOptions {
                max_age: Some(Duration::hours(2)),
                ..Default::default()
            },
        );

        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(2)));
    }

    #[test]
    fn test_secure_flag_follows_configuration() {
        let cookie = CookieFactory::new(false).create_cookie(
            SESSION_COOKIE,
            String::new(),
            CookieOptions::default(),
        );
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = CookieFactory::new(false).create_expired_cookie("oauthstate", "/auth");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/auth"));
        assert!(cookie.max_age().unwrap() <= Duration::ZERO);
    }

    #[test]
    fn test_browser_session_cookie() {
        let cookie = CookieFactory::new(false).create_cookie(
            SESSION_COOKIE,
            "v".to_string(),
            CookieOptions {
                max_age: None,
                ..Default::default()
            },
        );
        assert_eq!(cookie.max_age(), None);
    }
}
