//! Login orchestration
//!
//! [`Greenlight`] ties the pieces together. It owns the registered provider
//! adapters, the session and state managers, and the application's login
//! callback, and it mounts the auth routes into an actix-web app.
//!
//! ```text
//! GET {mount}/{provider}/login     -> 307 to provider, sets `oauthstate`
//! GET {mount}/{provider}/callback  -> session cookie + application response, or 307 to `/`
//! GET {mount}/user                 -> current user as JSON, or 401
//! GET {mount}/logout               -> clears the session, 307 to `/`
//! ```

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::{GreenlightError, Result};
use crate::handlers;
use crate::models::UserData;
use crate::oauth::{
    validate_state, GitHubProvider, GoogleProvider, IdentityProvider, OAuthCallback, StateManager,
};
use crate::session::SessionManager;
use crate::settings::{normalize_mount_path, GreenlightSettings, ProviderSettings};
use crate::utils::{LoggingHelper, ResponseBuilder};

/// Where every aborted flow and logout lands
pub const DEFAULT_REDIRECT: &str = "/";

/// Route names under the mount path that providers may not use
const RESERVED_ROUTE_NAMES: [&str; 2] = ["user", "logout"];

/// Application hook invoked once per successful login
///
/// The returned response is sent to the browser with the session cookie attached.
pub trait LoginCallback: Send + Sync {
    fn login_completed(&self, req: &HttpRequest, user: &UserData) -> HttpResponse;
}

impl<F> LoginCallback for F
where
    F: Fn(&HttpRequest, &UserData) -> HttpResponse + Send + Sync,
{
    fn login_completed(&self, req: &HttpRequest, user: &UserData) -> HttpResponse {
        self(req, user)
    }
}

/// Callback that redirects to a fixed location after login
pub struct RedirectOnLogin(pub String);

impl Default for RedirectOnLogin {
    fn default() -> Self {
        Self(DEFAULT_REDIRECT.to_string())
    }
}

impl LoginCallback for RedirectOnLogin {
    fn login_completed(&self, _req: &HttpRequest, _user: &UserData) -> HttpResponse {
        ResponseBuilder::redirect(&self.0, Vec::new())
    }
}

/// Provider bound to a route scope
///
/// Handlers find their adapter through this scope data, so a callback is always
/// processed by the adapter whose route it arrived on.
pub struct ProviderRoute(pub Arc<dyn IdentityProvider>);

#[derive(Clone)]
pub struct Greenlight {
    session_manager: SessionManager,
    state_manager: StateManager,
    providers: Vec<Arc<dyn IdentityProvider>>,
    callback: Arc<dyn LoginCallback>,
    mount_path: String,
    base_url: String,
}

impl Greenlight {
    /// Create an orchestrator with no providers registered yet
    ///
    /// `base_url` is the externally visible origin (e.g. `http://localhost:8080`)
    /// and `mount_path` the prefix for all auth routes.
    pub fn new(
        session_manager: SessionManager,
        base_url: &str,
        mount_path: &str,
        callback: impl LoginCallback + 'static,
    ) -> Self {
        let state_manager = StateManager::new(session_manager.cookie_factory());
        Self {
            session_manager,
            state_manager,
            providers: Vec::new(),
            callback: Arc::new(callback),
            mount_path: normalize_mount_path(mount_path),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build from settings, registering every configured provider
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - Session keys are invalid
    /// - A configured provider is missing its credentials
    /// - No provider is configured at all
    pub fn from_settings(
        settings: &GreenlightSettings,
        callback: impl LoginCallback + 'static,
    ) -> Result<Self> {
        let session_manager = SessionManager::from_settings(settings)?;
        let mut greenlight = Self::new(
            session_manager,
            &settings.application.redirect_base_url,
            &settings.mount_path(),
            callback,
        );
        let timeout = settings.http_timeout();

        match &settings.github {
            Some(github) => {
                let (id, secret) = provider_credentials("github", github)?;
                let config = GitHubProvider::config(id, secret, greenlight.callback_url("github"))?
                    .with_timeout(timeout);
                greenlight.register(GitHubProvider::new(config)?)?;
            }
            None => LoggingHelper::log_provider_not_configured("github"),
        }

        match &settings.google {
            Some(google) => {
                let config = match &google.credentials_file {
                    Some(path) => GoogleProvider::config_from_credentials_file(
                        path,
                        greenlight.callback_url("google"),
                    )?,
                    None => {
                        let (id, secret) = provider_credentials("google", &google.credentials())?;
                        GoogleProvider::config(id, secret, greenlight.callback_url("google"))?
                    }
                };
                greenlight.register(GoogleProvider::new(config.with_timeout(timeout))?)?;
            }
            None => LoggingHelper::log_provider_not_configured("google"),
        }

        if greenlight.providers.is_empty() {
            return Err(GreenlightError::Configuration(
                "No identity providers configured".to_string(),
            ));
        }
        LoggingHelper::log_providers_summary(&greenlight.provider_names());

        Ok(greenlight)
    }

    /// Register a provider adapter under its own name
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is already taken, collides with a
    /// fixed route, or is not usable as a path segment
    pub fn register(&mut self, provider: impl IdentityProvider + 'static) -> Result<()> {
        self.register_shared(Arc::new(provider))
    }

    /// [`Greenlight::register`] for an adapter that is already shared
    ///
    /// # Errors
    ///
    /// See [`Greenlight::register`].
    pub fn register_shared(&mut self, provider: Arc<dyn IdentityProvider>) -> Result<()> {
        let name = provider.name();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(GreenlightError::Configuration(format!(
                "Provider name {name:?} is not a valid route segment"
            )));
        }
        if RESERVED_ROUTE_NAMES.contains(&name) {
            return Err(GreenlightError::Configuration(format!(
                "Provider name {name:?} collides with a built-in route"
            )));
        }
        if self.providers.iter().any(|p| p.name() == name) {
            return Err(GreenlightError::Configuration(format!(
                "Provider {name:?} is already registered"
            )));
        }

        LoggingHelper::log_provider_registered(name, &self.mount_path);
        self.providers.push(provider);
        Ok(())
    }

    /// Builder-style [`Greenlight::register`]
    ///
    /// # Errors
    ///
    /// See [`Greenlight::register`].
    pub fn with_provider(mut self, provider: impl IdentityProvider + 'static) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    /// Absolute callback URL for the provider called `name`
    #[must_use]
    pub fn callback_url(&self, name: &str) -> String {
        format!("{}{}/{name}/callback", self.base_url, self.mount_path)
    }

    /// Mount the auth routes into an app
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.clone()));

        for provider in &self.providers {
            cfg.service(
                web::scope(&format!("{}/{}", self.mount_path, provider.name()))
                    .app_data(web::Data::new(ProviderRoute(Arc::clone(provider))))
                    .route("/login", web::get().to(handlers::start_login))
                    .route("/callback", web::get().to(handlers::complete_login)),
            );
        }

        cfg.route(
            &format!("{}/user", self.mount_path),
            web::get().to(handlers::user_info),
        )
        .route(
            &format!("{}/logout", self.mount_path),
            web::get().to(handlers::logout),
        );
    }

    /// Run the callback half of a login flow
    ///
    /// Validates the anti-forgery state before any provider call, then exchanges
    /// the code and fetches the profile.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`GreenlightError::AntiForgeryValidation`] if the state does not match
    /// - [`GreenlightError::TokenExchange`] if the provider reported an error, the
    ///   code is missing, or the exchange failed
    /// - [`GreenlightError::ProfileFetch`] if the profile is unusable
    pub async fn authenticate(
        &self,
        provider: &dyn IdentityProvider,
        req: &HttpRequest,
        callback: &OAuthCallback,
    ) -> Result<UserData> {
        let stored_state = self.state_manager.state_from_request(req);
        if !validate_state(stored_state.as_deref(), callback.state.as_deref()) {
            return Err(GreenlightError::AntiForgeryValidation);
        }

        if let Some(error) = &callback.error {
            return Err(GreenlightError::TokenExchange(format!(
                "provider reported error: {error} {}",
                callback.error_description.as_deref().unwrap_or_default()
            )));
        }
        let code = callback
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                GreenlightError::TokenExchange("callback has no authorization code".to_string())
            })?;

        let access_token = provider.exchange_code(code).await?;
        let user = provider.fetch_profile(&access_token).await?;

        if !user.is_valid() || user.provider != provider.name() {
            return Err(GreenlightError::ProfileFetch(format!(
                "{} returned an incomplete identity",
                provider.name()
            )));
        }
        Ok(user)
    }

    /// Build the response for a completed login
    ///
    /// The application's callback decides the response; the session cookie and
    /// the state discard cookie are attached to it.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the session cookie cannot be produced
    pub fn complete(&self, req: &HttpRequest, user: &UserData) -> Result<HttpResponse> {
        let session_cookie = self.session_manager.create_session_cookie(user)?;
        let mut response = self.callback.login_completed(req, user);
        for cookie in [session_cookie, self.state_manager.expired_state_cookie()] {
            response
                .add_cookie(&cookie)
                .map_err(|e| GreenlightError::Encoding(e.to_string()))?;
        }
        Ok(response)
    }

    /// Response for an aborted flow: back to `/`, state discarded, no session
    #[must_use]
    pub fn aborted_response(&self) -> HttpResponse {
        ResponseBuilder::redirect(
            DEFAULT_REDIRECT,
            vec![self.state_manager.expired_state_cookie()],
        )
    }

    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn IdentityProvider>] {
        &self.providers
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    #[must_use]
    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    #[must_use]
    pub fn state_manager(&self) -> &StateManager {
        &self.state_manager
    }

    #[must_use]
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Current user, if the request carries a valid session
    #[must_use]
    pub fn get_user_data(&self, req: &HttpRequest) -> Option<UserData> {
        self.session_manager.get_user_data(req)
    }
}

fn provider_credentials(name: &str, settings: &ProviderSettings) -> Result<(String, String)> {
    let id = settings.get_client_id().unwrap_or_default();
    let secret = settings.get_client_secret().unwrap_or_default();
    if id.is_empty() || secret.is_empty() {
        return Err(GreenlightError::Configuration(format!(
            "Provider {name} is configured but its client id or secret is missing"
        )));
    }
    Ok((id, secret))
}
