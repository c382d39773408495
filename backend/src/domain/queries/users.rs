//! User lookups and registration writes.

use chrono::SecondsFormat;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{DashboardQueries, failed};
use crate::domain::ports::{Collection, CollectionAccessor, Document, Filter, ID_FIELD};
use crate::domain::{Error, PasswordHash, User, UserId, normalize_email};

/// Error code attached to duplicate registration conflicts.
pub const DUPLICATE_USER_CODE: &str = "duplicate_user";

/// Message carried by duplicate registration conflicts.
pub const DUPLICATE_USER_MESSAGE: &str = "User already exists.";

/// Whether `error` is the conflict raised by [`DashboardQueries::create_user`].
pub fn is_duplicate_user(error: &Error) -> bool {
    error
        .details()
        .and_then(|details| details.get("code"))
        .and_then(Value::as_str)
        == Some(DUPLICATE_USER_CODE)
}

impl<A: CollectionAccessor + ?Sized> DashboardQueries<A> {
    /// User registered with `email`, if any.
    ///
    /// Surrounding whitespace is ignored and letter case never matters, so
    /// records stored with their original casing are still found.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let filter = Filter::eq_ignore_case("email", email.trim());
        let mut users: Vec<User> = self
            .load(Collection::Users, &filter, "fetch user")
            .await?;
        if users.len() > 1 {
            warn!(count = users.len(), "multiple users share an email");
        }
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users.into_iter().next())
    }

    /// Overwrite the stored password of user `id` with `hash`.
    ///
    /// Fails with `NotFound` when no user has that id.
    pub async fn replace_password_hash(&self, id: &UserId, hash: &PasswordHash) -> Result<(), Error> {
        let mut patch = Document::new();
        patch.insert("password".to_owned(), json!(hash.as_str()));
        let summary = self
            .accessor
            .update_one(Collection::Users, &Filter::by_id(id.as_ref()), patch)
            .await
            .map_err(failed("update password"))?;
        if summary.matched == 0 {
            return Err(Error::not_found(format!("User {id} not found.")));
        }
        Ok(())
    }

    /// Every registered user.
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.load(Collection::Users, &Filter::all(), "fetch users")
            .await
    }

    /// Store a new user and return its id.
    ///
    /// Only a [`PasswordHash`] is accepted, so plaintext passwords cannot
    /// reach the store. Fails with a `Conflict` error when the email is taken.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &PasswordHash,
    ) -> Result<UserId, Error> {
        let operation = "create user";
        let email = normalize_email(email);
        if self.get_user_by_email(&email).await?.is_some() {
            info!("registration rejected for existing email");
            return Err(Error::conflict(DUPLICATE_USER_MESSAGE)
                .with_details(json!({ "field": "email", "code": DUPLICATE_USER_CODE })));
        }

        let id = UserId::random();
        let mut document = Document::new();
        document.insert(ID_FIELD.to_owned(), json!(id.as_ref()));
        document.insert("name".to_owned(), json!(name.trim()));
        document.insert("email".to_owned(), json!(email));
        document.insert("password".to_owned(), json!(password.as_str()));
        document.insert(
            "created_at".to_owned(),
            json!(
                self.clock
                    .utc()
                    .to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        );

        let raw_id = self
            .accessor
            .insert_one(Collection::Users, document)
            .await
            .map_err(failed(operation))?;
        let stored = UserId::new(raw_id)
            .map_err(|err| Error::internal(format!("store returned an invalid id: {err}")))?;
        info!(user_id = %stored, "user registered");
        Ok(stored)
    }
}
