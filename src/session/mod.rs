//! Session Management Module
//!
//! - [`codec`] - authenticated encryption of cookie values
//! - [`cookie`] - cookie construction
//! - [`manager`] - reading, setting and clearing the `session` cookie

pub mod codec;
pub mod cookie;
pub mod manager;

pub use codec::{CredentialCodec, SessionKeys};
pub use cookie::{CookieFactory, CookieOptions, SESSION_COOKIE};
pub use manager::SessionManager;
