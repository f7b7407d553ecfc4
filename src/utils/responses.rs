//! HTTP response helpers
//!
//! Consistent redirect and JSON error responses for the login routes. Login routes
//! never render an error page; every failure is a redirect or a small JSON body.

use actix_web::{cookie::Cookie, http::header, http::StatusCode, HttpResponse};
use serde_json::json;

/// Unified response builder for the auth routes
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create a `307 Temporary Redirect` carrying the given cookies
    #[must_use]
    pub fn redirect(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::TemporaryRedirect();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder
            .insert_header((header::LOCATION, location.to_string()))
            .finish()
    }

    /// Create a JSON error response `{"error", "error_description"}`
    #[must_use]
    pub fn json_error(status: StatusCode, error: &str, description: &str) -> HttpResponse {
        HttpResponse::build(status).json(json!({
            "error": error,
            "error_description": description
        }))
    }

    /// `401` for requests that carry no usable session
    #[must_use]
    pub fn no_session() -> HttpResponse {
        Self::json_error(
            StatusCode::UNAUTHORIZED,
            "no_session",
            "No valid session cookie was presented",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_is_temporary_with_location() {
        let cookie = Cookie::new("a", "b");
        let response = ResponseBuilder::redirect("/somewhere", vec![cookie]);

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/somewhere"
        );
        assert_eq!(response.cookies().count(), 1);
    }

    #[test]
    fn test_no_session_is_unauthorized_json() {
        let response = ResponseBuilder::no_session();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
