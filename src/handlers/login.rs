//! Login start and callback handlers

use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::{Greenlight, ProviderRoute};
use crate::oauth::OAuthCallback;
use crate::utils::{LoggingHelper, ResponseBuilder};

/// `GET {mount}/{provider}/login`
///
/// Issues a fresh anti-forgery token and sends the browser to the provider.
pub async fn start_login(
    greenlight: web::Data<Greenlight>,
    route: web::Data<ProviderRoute>,
) -> HttpResponse {
    let provider = &route.0;
    let (state, state_cookie) = greenlight.state_manager().issue_state();

    match provider.authorization_url(&state) {
        Ok(url) => {
            LoggingHelper::log_login_started(provider.name());
            ResponseBuilder::redirect(url.as_str(), vec![state_cookie])
        }
        Err(e) => {
            log::error!("Cannot build authorization URL for {}: {e}", provider.name());
            greenlight.aborted_response()
        }
    }
}

/// `GET {mount}/{provider}/callback`
///
/// Every outcome expires the `oauthstate` cookie. Failures redirect to `/`
/// without a session; the reason is only logged.
pub async fn complete_login(
    req: HttpRequest,
    greenlight: web::Data<Greenlight>,
    route: web::Data<ProviderRoute>,
) -> HttpResponse {
    let provider = route.0.as_ref();
    let callback = web::Query::<OAuthCallback>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();

    let outcome = match greenlight.authenticate(provider, &req, &callback).await {
        Ok(user) => greenlight.complete(&req, &user).map(|response| (user, response)),
        Err(e) => Err(e),
    };

    match outcome {
        Ok((user, response)) => {
            LoggingHelper::log_login_completed(provider.name(), &user.email);
            response
        }
        Err(e) => {
            LoggingHelper::log_login_aborted(provider.name(), &e);
            greenlight.aborted_response()
        }
    }
}
