//! Dashboard read and write queries.
//!
//! [`DashboardQueries`] is the only component that talks to the
//! [`CollectionAccessor`] port. It performs the invoice/customer joins and
//! monetary aggregation in memory on top of plain equality reads, sums cents
//! as integers, and formats currency only when building output rows.
//!
//! Every store failure is logged with its collection and operation and
//! surfaced as a domain [`Error`] whose message reads `Failed to <operation>.`.

mod customers;
mod invoices;
mod migration;
mod summary;
mod users;

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::domain::Error;
use crate::domain::ports::{Collection, CollectionAccessor, DatabaseError, Document, Filter};

pub use invoices::INVOICES_PER_PAGE;
pub use migration::HashMigrationReport;
pub use summary::LATEST_INVOICES_LIMIT;
pub use users::{DUPLICATE_USER_CODE, DUPLICATE_USER_MESSAGE, is_duplicate_user};

/// Domain queries over the dashboard collections.
pub struct DashboardQueries<A: ?Sized> {
    accessor: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A: ?Sized> Clone for DashboardQueries<A> {
    fn clone(&self) -> Self {
        Self {
            accessor: Arc::clone(&self.accessor),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<A: ?Sized> DashboardQueries<A> {
    /// Build the query layer over `accessor`, stamping dates from `clock`.
    pub fn new(accessor: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { accessor, clock }
    }

    /// Underlying collection accessor.
    pub fn accessor(&self) -> &Arc<A> {
        &self.accessor
    }
}

impl<A: CollectionAccessor + ?Sized> DashboardQueries<A> {
    async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        filter: &Filter,
        operation: &'static str,
    ) -> Result<Vec<T>, Error> {
        let documents = self
            .accessor
            .find_many(collection, filter)
            .await
            .map_err(failed(operation))?;
        documents
            .into_iter()
            .map(|document| decode(collection, document))
            .collect::<Result<Vec<T>, _>>()
            .map_err(failed(operation))
    }
}

pub(crate) fn decode<T: DeserializeOwned>(
    collection: Collection,
    document: Document,
) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| DatabaseError::decode(collection, err.to_string()))
}

pub(crate) fn encode<T: Serialize>(
    collection: Collection,
    value: &T,
) -> Result<Document, DatabaseError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(DatabaseError::decode(
            collection,
            format!("expected an object, got {other}"),
        )),
        Err(err) => Err(DatabaseError::decode(collection, err.to_string())),
    }
}

/// Map a store failure to the domain error for `operation`, logging it.
///
/// Unreachable stores become `ServiceUnavailable`; everything else is an
/// internal error. Both carry the `Failed to <operation>.` message.
pub(crate) fn failed(operation: &'static str) -> impl Fn(DatabaseError) -> Error {
    move |err| {
        error!(
            collection = %err.collection(),
            operation,
            error = %err,
            "database operation failed"
        );
        let message = format!("Failed to {operation}.");
        if err.is_connection() {
            Error::service_unavailable(message)
        } else {
            Error::internal(message)
        }
    }
}

/// Lower-cased, trimmed search needle.
fn needle(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests;
