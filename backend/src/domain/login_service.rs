//! Credential authentication against stored password hashes.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{CollectionAccessor, LoginService};
use crate::domain::queries::DashboardQueries;
use crate::domain::{
    Error, LoginCredentials, StoredScheme, User, UserId, hash_password, verify_stored_password,
};

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// [`LoginService`] that looks users up by email and verifies the password
/// hash.
///
/// Unknown users, wrong passwords, and unusable stored hashes all fail the
/// same way so callers cannot tell which one happened. A bcrypt hash that
/// verifies is replaced by an Argon2id hash of the same password.
pub struct CredentialLoginService<A: ?Sized> {
    queries: DashboardQueries<A>,
}

impl<A: ?Sized> CredentialLoginService<A> {
    /// Authenticate against users visible through `queries`.
    pub fn new(queries: DashboardQueries<A>) -> Self {
        Self { queries }
    }
}

impl<A: CollectionAccessor + ?Sized> CredentialLoginService<A> {
    /// Replace a verified bcrypt hash. Failures are logged and leave the
    /// bcrypt hash in place.
    async fn upgrade_legacy_hash(&self, user: &User, password: &str) {
        let hash = match hash_password(password) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "could not rehash legacy password");
                return;
            }
        };
        match self.queries.replace_password_hash(&user.id, &hash).await {
            Ok(()) => info!(user_id = %user.id, "legacy bcrypt hash upgraded to argon2id"),
            Err(err) => warn!(user_id = %user.id, error = %err, "legacy hash upgrade not stored"),
        }
    }
}

#[async_trait]
impl<A> LoginService for CredentialLoginService<A>
where
    A: CollectionAccessor + ?Sized + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(user) = self.queries.get_user_by_email(credentials.email()).await? else {
            debug!("login attempt for unknown email");
            return Err(invalid_credentials());
        };

        let stored = user.stored_password();
        match verify_stored_password(credentials.password(), stored) {
            Ok(true) => {
                if StoredScheme::of(stored) == StoredScheme::Bcrypt {
                    self.upgrade_legacy_hash(&user, credentials.password()).await;
                }
                debug!(user_id = %user.id, "login succeeded");
                Ok(user.id)
            }
            Ok(false) => {
                debug!(user_id = %user.id, "login password mismatch");
                Err(invalid_credentials())
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "stored password is not a usable hash");
                Err(invalid_credentials())
            }
        }
    }
}
