// Centralized log lines for the login flow
//
// Client secrets, authorization codes, access tokens and cookie values never pass
// through here.
use log::{debug, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log that a provider adapter was registered under its route namespace
    pub fn log_provider_registered(provider: &str, mount_path: &str) {
        info!("✅ {provider} OAuth2 configured ({mount_path}/{provider}/login)");
    }

    /// Log that a provider section is absent from configuration
    pub fn log_provider_not_configured(provider: &str) {
        info!("❌ {provider} OAuth2 not configured - missing credentials");
    }

    /// Log summary of configured providers
    pub fn log_providers_summary(provider_names: &[&str]) {
        info!("🎯 Configured OAuth providers: {provider_names:?}");
    }

    /// Log the start of a login flow
    pub fn log_login_started(provider: &str) {
        info!("🔐 Starting {provider} login, redirecting to provider");
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(provider: &str) {
        debug!("🔄 Exchanging authorization code for tokens with {provider}");
    }

    /// Log a successfully completed login
    pub fn log_login_completed(provider: &str, email: &str) {
        info!("Successfully logged in user: {email} (provider: {provider})");
    }

    /// Log an aborted login. The reason stays server-side.
    pub fn log_login_aborted(provider: &str, reason: &dyn std::fmt::Display) {
        warn!("Login via {provider} aborted: {reason}");
    }

    /// Log a cleared session
    pub fn log_session_cleared() {
        debug!("Session cookie cleared");
    }

    /// Log that session keys were generated for this process
    pub fn log_generated_keys() {
        warn!("🔑 No session keys configured, generated ephemeral keys; sessions will not survive a restart");
    }
}
