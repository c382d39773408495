//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing the backing store. HTTP handler
//! tests substitute [`FixtureLoginService`] or a mock instead of wiring
//! persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Fixed-account authenticator for handler tests and local demos.
///
/// `user@nextmail.com` / `123456` authenticates and yields a fixed user id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

/// Email accepted by [`FixtureLoginService`].
pub const FIXTURE_EMAIL: &str = "user@nextmail.com";
/// Password accepted by [`FixtureLoginService`].
pub const FIXTURE_PASSWORD: &str = "123456";
/// User id returned by [`FixtureLoginService`].
pub const FIXTURE_USER_ID: &str = "410544b2-4001-4271-9855-fec4b6a6442a";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.email() == FIXTURE_EMAIL && credentials.password() == FIXTURE_PASSWORD {
            UserId::new(FIXTURE_USER_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
