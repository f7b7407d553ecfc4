use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::Greenlight;
use crate::models::HealthResponse;

/// Health check endpoint
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: "Greenlight is running".to_string(),
    })
}

/// Generated landing page: a sign-in button per provider, or the current user
pub async fn sign_in_page(req: HttpRequest, greenlight: web::Data<Greenlight>) -> HttpResponse {
    let body = match greenlight.get_user_data(&req) {
        Some(user) => format!(
            r#"<p>Signed in as <strong>{}</strong> via {}.</p>
<p><a href="{}/logout">Sign out</a></p>"#,
            escape_html(&user.email),
            escape_html(&user.provider),
            greenlight.mount_path()
        ),
        None => greenlight
            .provider_names()
            .iter()
            .map(|name| {
                format!(
                    r#"<p><a class="button" href="{}/{name}/login">Sign in with {name}</a></p>"#,
                    greenlight.mount_path()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };

    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sign In</title>
</head>
<body>
{body}
</body>
</html>"#
    ))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }
}
