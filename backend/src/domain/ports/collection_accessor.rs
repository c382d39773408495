//! Driven port for generic document-collection access.
//!
//! Every domain query reaches the document store through this trait. The
//! shape is deliberately narrow: list with an equality filter, insert one,
//! patch one, delete one. Joins and aggregation happen in the domain layer on
//! top of these primitives so adapters stay trivial to fake.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;

/// A stored document: a JSON object keyed by field name.
///
/// Documents always carry their application identifier in the `id` field.
/// Adapters fill it from the store-native identifier (for example MongoDB's
/// `_id`) when a record was written without one.
pub type Document = Map<String, Value>;

/// Field holding the application-level identifier of every document.
pub const ID_FIELD: &str = "id";

/// Collections known to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Customer records, seeded outside this service.
    Customers,
    /// Invoices referencing customers by id.
    Invoices,
    /// Dashboard operators.
    Users,
    /// Monthly revenue totals, read-only.
    Revenue,
}

impl Collection {
    /// Every collection, in a stable order.
    pub const ALL: [Self; 4] = [Self::Customers, Self::Invoices, Self::Users, Self::Revenue];

    /// Store-level collection name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Invoices => "invoices",
            Self::Users => "users",
            Self::Revenue => "revenue",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One field test inside a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field equals the value exactly.
    Eq(Value),
    /// The field is a string equal to the text, ignoring case.
    EqIgnoreCase(String),
}

impl Condition {
    fn holds(&self, field: Option<&Value>) -> bool {
        match self {
            Self::Eq(value) => field == Some(value),
            Self::EqIgnoreCase(text) => field
                .and_then(Value::as_str)
                .is_some_and(|stored| stored.to_lowercase() == text.to_lowercase()),
        }
    }
}

/// Conjunction of field tests applied by [`CollectionAccessor`] operations.
///
/// An empty filter matches every document. Otherwise a document matches when
/// every listed field is present and passes its [`Condition`].
///
/// [`Filter::by_id`] names the application identifier; adapters whose
/// records may lack an `id` also match it against the store-native key.
///
/// # Examples
/// ```
/// use dashboard::domain::ports::{Document, Filter};
/// use serde_json::json;
///
/// let filter = Filter::eq("status", "paid").and("customer_id", "c-1");
/// let doc: Document = serde_json::from_value(json!({
///     "status": "paid",
///     "customer_id": "c-1",
///     "email": "Amy@Burns.com",
///     "amount": 100,
/// }))
/// .expect("object");
/// assert!(filter.matches(&doc));
/// assert!(Filter::all().matches(&doc));
/// assert!(Filter::eq_ignore_case("email", "amy@burns.com").matches(&doc));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    /// Filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Filter matching documents whose string `field` equals `text` in any
    /// letter case.
    pub fn eq_ignore_case(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::all().and_ignore_case(field, text)
    }

    /// Filter matching documents by application identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, id.into())
    }

    /// Add another equality condition to the conjunction.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.into(), Condition::Eq(value.into())));
        self
    }

    /// Add a case-insensitive string condition to the conjunction.
    #[must_use]
    pub fn and_ignore_case(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.conditions
            .push((field.into(), Condition::EqIgnoreCase(text.into())));
        self
    }

    /// Whether the filter has no conditions.
    pub fn is_all(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Field tests that must all hold.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions
            .iter()
            .map(|(field, condition)| (field.as_str(), condition))
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.holds(document.get(field)))
    }
}

/// Outcome of a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Documents matched by the filter (0 or 1).
    pub matched: u64,
    /// Documents whose contents changed.
    pub modified: u64,
}

define_port_error! {
    /// Failures raised by collection accessor adapters.
    pub enum DatabaseError {
        /// The store could not be reached or the handshake failed.
        Connection { collection: Collection, message: String } =>
            "{collection}: connection failed: {message}",
        /// The store rejected or failed to execute the operation.
        Query { collection: Collection, message: String } =>
            "{collection}: query failed: {message}",
        /// A document could not be converted to or from the store format.
        Decode { collection: Collection, message: String } =>
            "{collection}: document could not be decoded: {message}",
    }
}

impl DatabaseError {
    /// Collection the failing operation targeted.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Connection { collection, .. }
            | Self::Query { collection, .. }
            | Self::Decode { collection, .. } => *collection,
        }
    }

    /// Whether the failure came from an unreachable store.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Port for reading and writing documents in named collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionAccessor: Send + Sync {
    /// Return every document in `collection` matching `filter`.
    ///
    /// Order is unspecified; callers sort.
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DatabaseError>;

    /// Insert `document`, assigning a fresh `id` when it has none.
    ///
    /// Returns the identifier of the stored document.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<String, DatabaseError>;

    /// Overwrite the fields in `patch` on the first document matching
    /// `filter`. Fields absent from `patch` are left untouched.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<UpdateSummary, DatabaseError>;

    /// Delete the first document matching `filter`, returning how many were
    /// removed (0 or 1).
    async fn delete_one(&self, collection: Collection, filter: &Filter)
    -> Result<u64, DatabaseError>;
}
