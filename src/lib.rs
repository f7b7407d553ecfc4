#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Stateless OAuth2 login flows with encrypted session cookies for actix-web
//!
//! ```rust,ignore
//! let settings = GreenlightSettings::load()?;
//! let greenlight = Greenlight::from_settings(&settings, RedirectOnLogin::default())?;
//!
//! HttpServer::new(move || {
//!     let greenlight = greenlight.clone();
//!     App::new().configure(move |cfg| greenlight.configure(cfg))
//! })
//! ```

/// Version of the greenlight crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use auth::{Greenlight, LoginCallback, RedirectOnLogin};
pub use error::{GreenlightError, Result};
pub use models::UserData;
pub use oauth::{GitHubProvider, GoogleProvider, IdentityProvider, ProviderConfig};
pub use session::{CredentialCodec, SessionKeys, SessionManager};
pub use settings::GreenlightSettings;
