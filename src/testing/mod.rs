//! Testing utilities for Greenlight
//!
//! Available to unit tests and, behind the `testing` feature, to integration tests.
//!
//! - [`fixtures`] - pre-built users, managers and cookies
//! - [`mock`] - a scripted [`IdentityProvider`](crate::oauth::IdentityProvider)
//!
//! ```rust,ignore
//! use greenlight::testing::{StubProvider, TestFixtures};
//!
//! let mut greenlight = TestFixtures::greenlight();
//! greenlight.register(StubProvider::new("stub"))?;
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::StubProvider;

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "ada@x.com";

    /// Default test user name
    pub const TEST_USER_NAME: &str = "Ada";

    /// Externally visible origin used by test instances
    pub const TEST_BASE_URL: &str = "http://localhost:8080";

    /// Mount path used by test instances
    pub const TEST_MOUNT_PATH: &str = "/api/auth";

    /// Access token handed out by [`super::StubProvider`]
    pub const STUB_ACCESS_TOKEN: &str = "stub-access-token";
}
