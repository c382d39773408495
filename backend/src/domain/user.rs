//! Dashboard operator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Canonical form of an email used for storage and lookups.
///
/// # Examples
/// ```
/// use dashboard::domain::normalize_email;
///
/// assert_eq!(normalize_email("  Admin@Example.COM "), "admin@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A user as stored in the `users` collection.
///
/// `password` is kept as the raw stored string. Records written by this
/// service always hold a PHC hash. Older records may hold a bcrypt hash,
/// which login verifies and upgrades, or plaintext, which login rejects and
/// the hash migration utility rewrites.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Application identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email as stored. Users registered here are stored lower-cased;
    /// older records keep the case they were typed in.
    pub email: String,
    #[serde(rename = "password")]
    stored_password: String,
    /// Registration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Assemble a user from stored fields.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        stored_password: impl Into<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            stored_password: stored_password.into(),
            created_at,
        }
    }

    /// Stored password value, normally a PHC hash string.
    pub fn stored_password(&self) -> &str {
        self.stored_password.as_str()
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_record_without_created_at() {
        let user: User = serde_json::from_value(json!({
            "id": "410544b2-4001-4271-9855-fec4b6a6442a",
            "name": "User",
            "email": "user@nextmail.com",
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo",
        }))
        .expect("decode user");
        assert!(user.created_at.is_none());
        assert!(user.stored_password().starts_with("$argon2id$"));
    }

    #[test]
    fn debug_hides_password() {
        let user = User::new(UserId::random(), "A", "a@b.co", "secret", None);
        assert!(!format!("{user:?}").contains("secret"));
    }
}
