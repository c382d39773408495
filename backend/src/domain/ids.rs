//! Opaque document identifiers.
//!
//! Identifiers are assigned by the collection accessor (UUID v4 strings for
//! new documents) but seeded data may use any non-blank string, so the
//! domain only checks shape, never format.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for identifier construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// Identifier was empty or whitespace.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier carried leading or trailing whitespace.
    #[error("identifier must not have surrounding whitespace")]
    Padded,
}

fn check(raw: &str) -> Result<(), IdValidationError> {
    if raw.trim().is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdValidationError::Padded);
    }
    Ok(())
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
                let id = id.into();
                check(&id)?;
                Ok(Self(id))
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

opaque_id! {
    /// Identifier of a customer document.
    CustomerId
}

opaque_id! {
    /// Identifier of an invoice document.
    InvoiceId
}

opaque_id! {
    /// Identifier of a dashboard user.
    UserId
}
