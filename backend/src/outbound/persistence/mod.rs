//! Document store adapters.
//!
//! - [`settings`]: `MONGODB_*` configuration and its validation.
//! - [`connection`]: the single-flight [`ConnectionManager`].
//! - [`mongo`]: the MongoDB [`CollectionAccessor`] adapter.
//! - [`memory`]: an in-process adapter for tests and local demos.
//!
//! Adapters only translate between JSON documents and the store format. Joins,
//! aggregation, and validation live in the domain.
//!
//! [`CollectionAccessor`]: crate::domain::ports::CollectionAccessor

pub mod connection;
pub mod memory;
pub mod mongo;
pub mod settings;

use serde_json::Value;

use crate::domain::ports::{Document, ID_FIELD};

pub use connection::{ConnectionError, ConnectionManager, Connector};
pub use memory::InMemoryCollectionAccessor;
pub use mongo::{MongoCollectionAccessor, MongoConnectionManager, MongoConnector, MongoHandle};
pub use settings::{ConfigurationError, ConnectionSettings, MongoSettings};

/// Return the document's `id`, generating a UUID v4 when it is missing or
/// blank.
pub(crate) fn ensure_id(document: &mut Document) -> String {
    if let Some(Value::String(id)) = document.get(ID_FIELD)
        && !id.trim().is_empty()
    {
        return id.clone();
    }
    let id = uuid::Uuid::new_v4().to_string();
    document.insert(ID_FIELD.to_owned(), Value::String(id.clone()));
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_id_replaces_blank_ids() {
        let mut document = Document::new();
        document.insert(ID_FIELD.to_owned(), json!("  "));
        let id = ensure_id(&mut document);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_eq!(document.get(ID_FIELD), Some(&json!(id)));
    }

    #[test]
    fn ensure_id_keeps_existing_ids() {
        let mut document = Document::new();
        document.insert(ID_FIELD.to_owned(), json!("c-1"));
        assert_eq!(ensure_id(&mut document), "c-1");
    }
}
