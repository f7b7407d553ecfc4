//! Error taxonomy for login flows and session handling
//!
//! Every variant is confined to the request or setup step that produced it. Flow
//! failures become a redirect to the default page, and session decode failures
//! become "not logged in". None of these messages are ever sent to the browser.

use thiserror::Error;

/// Errors produced while configuring providers, running a login flow, or
/// encoding and decoding session credentials
#[derive(Debug, Error)]
pub enum GreenlightError {
    /// Missing or invalid provider credentials or settings. Fatal at setup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The state echoed by the provider does not match the one-time state cookie
    #[error("Anti-forgery state validation failed")]
    AntiForgeryValidation,

    /// The authorization code could not be exchanged for an access token
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// The provider's userinfo endpoint failed or returned an unusable profile
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    /// The session credential is forged, corrupted, or expired.
    /// Carries no detail on purpose.
    #[error("Invalid session credential")]
    InvalidCredential,

    /// The session credential could not be produced
    #[error("Failed to encode session credential: {0}")]
    Encoding(String),
}

/// Result alias used across the crate
pub type Result<T, E = GreenlightError> = std::result::Result<T, E>;
