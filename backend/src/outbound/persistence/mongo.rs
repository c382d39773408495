//! MongoDB adapter for the [`CollectionAccessor`] port.
//!
//! Documents cross the boundary as JSON objects. On the way in they are
//! converted to BSON with `bson::to_document`; on the way out the driver's
//! `_id` is dropped and the rest is rendered as relaxed extended JSON, which
//! keeps integers and strings as plain JSON values.
//!
//! Records written without an application `id` are keyed by `_id` alone. On
//! read their `id` is filled from the `_id` (ObjectId hex or string), and id
//! filters match either key, so such records can be fetched, updated, and
//! deleted like any other.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document as BsonDocument, doc};
use mongodb::error::{Error as DriverError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection as MongoCollection, Database};
use serde_json::Value;

use super::connection::{ConnectionError, ConnectionManager, Connector};
use super::{ConnectionSettings, ensure_id};
use crate::domain::ports::{
    Collection, CollectionAccessor, Condition, DatabaseError, Document, Filter, ID_FIELD,
    UpdateSummary,
};

const NATIVE_ID_FIELD: &str = "_id";

/// Driver client plus the selected database.
#[derive(Clone, Debug)]
pub struct MongoHandle {
    client: Client,
    database: Database,
}

impl MongoHandle {
    /// Selected database.
    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// Opens MongoDB clients and confirms them with a `ping`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

fn handshake(err: DriverError) -> ConnectionError {
    ConnectionError::handshake(err.to_string())
}

#[async_trait]
impl Connector for MongoConnector {
    type Handle = MongoHandle;

    async fn establish(&self, settings: &ConnectionSettings) -> Result<MongoHandle, ConnectionError> {
        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(handshake)?;
        options.max_pool_size = Some(settings.max_pool_size);
        options.min_pool_size = Some(settings.min_pool_size);
        options.connect_timeout = Some(settings.connect_timeout);
        options.server_selection_timeout = Some(settings.socket_timeout);
        options.retry_reads = Some(settings.retry_reads);
        options.retry_writes = Some(settings.retry_writes);
        options.app_name = Some(settings.app_name.clone());

        let client = Client::with_options(options).map_err(handshake)?;
        let database = client.database(&settings.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(handshake)?;
        Ok(MongoHandle { client, database })
    }

    async fn release(&self, handle: MongoHandle) {
        handle.client.shutdown().await;
    }
}

/// Connection manager specialised for MongoDB.
pub type MongoConnectionManager = ConnectionManager<MongoConnector>;

/// [`CollectionAccessor`] backed by MongoDB.
///
/// Each operation acquires the shared handle from the connection manager, so
/// the first request after startup (or after a close) pays for the handshake.
#[derive(Clone)]
pub struct MongoCollectionAccessor {
    manager: Arc<MongoConnectionManager>,
}

impl MongoCollectionAccessor {
    /// Create an accessor over `manager`.
    pub fn new(manager: Arc<MongoConnectionManager>) -> Self {
        Self { manager }
    }

    async fn collection(
        &self,
        collection: Collection,
    ) -> Result<MongoCollection<BsonDocument>, DatabaseError> {
        let handle = self
            .manager
            .connect()
            .await
            .map_err(|err| DatabaseError::connection(collection, err.to_string()))?;
        Ok(handle.database().collection(collection.name()))
    }
}

fn driver_error(collection: Collection) -> impl Fn(DriverError) -> DatabaseError {
    move |err| match *err.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            DatabaseError::connection(collection, err.to_string())
        }
        _ => DatabaseError::query(collection, err.to_string()),
    }
}

fn to_bson_document(collection: Collection, document: Document) -> Result<BsonDocument, DatabaseError> {
    bson::to_document(&Value::Object(document))
        .map_err(|err| DatabaseError::decode(collection, err.to_string()))
}

fn native_id_text(native: Bson) -> Option<String> {
    match native {
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::String(id) if !id.trim().is_empty() => Some(id),
        _ => None,
    }
}

fn from_bson_document(collection: Collection, mut document: BsonDocument) -> Result<Document, DatabaseError> {
    let native = document.remove(NATIVE_ID_FIELD);
    let has_id = matches!(document.get(ID_FIELD), Some(Bson::String(id)) if !id.trim().is_empty());
    if !has_id && let Some(id) = native.and_then(native_id_text) {
        document.insert(ID_FIELD, id);
    }
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::decode(
            collection,
            format!("expected an object, got {other}"),
        )),
    }
}

/// `{$or: [{id}, {_id}]}`, with `_id` as an ObjectId when the text parses as one.
fn id_clause(id: &str) -> BsonDocument {
    let native = ObjectId::parse_str(id).map_or_else(|_| Bson::String(id.to_owned()), Bson::ObjectId);
    doc! { "$or": [ { ID_FIELD: id }, { NATIVE_ID_FIELD: native } ] }
}

/// Anchored, escaped, case-insensitive regex matching `text` exactly.
fn ignore_case_clause(text: &str) -> BsonDocument {
    doc! { "$regex": format!("^{}$", regex::escape(text)), "$options": "i" }
}

fn filter_document(collection: Collection, filter: &Filter) -> Result<BsonDocument, DatabaseError> {
    let mut query = BsonDocument::new();
    let mut id_clauses = Vec::new();
    for (field, condition) in filter.conditions() {
        match condition {
            Condition::Eq(Value::String(id)) if field == ID_FIELD => {
                id_clauses.push(id_clause(id));
            }
            Condition::Eq(value) => {
                let bson_value = bson::to_bson(value)
                    .map_err(|err| DatabaseError::decode(collection, err.to_string()))?;
                query.insert(field, bson_value);
            }
            Condition::EqIgnoreCase(text) => {
                query.insert(field, ignore_case_clause(text));
            }
        }
    }
    match id_clauses.len() {
        0 => {}
        1 => {
            for (key, value) in id_clauses.into_iter().flatten() {
                query.insert(key, value);
            }
        }
        _ => {
            query.insert("$and", id_clauses);
        }
    }
    Ok(query)
}

#[async_trait]
impl CollectionAccessor for MongoCollectionAccessor {
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DatabaseError> {
        let query = filter_document(collection, filter)?;
        let documents: Vec<BsonDocument> = self
            .collection(collection)
            .await?
            .find(query)
            .await
            .map_err(driver_error(collection))?
            .try_collect()
            .await
            .map_err(driver_error(collection))?;
        documents
            .into_iter()
            .map(|document| from_bson_document(collection, document))
            .collect()
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<String, DatabaseError> {
        let id = ensure_id(&mut document);
        let stored = to_bson_document(collection, document)?;
        self.collection(collection)
            .await?
            .insert_one(stored)
            .await
            .map_err(driver_error(collection))?;
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<UpdateSummary, DatabaseError> {
        let query = filter_document(collection, filter)?;
        let set = to_bson_document(collection, patch)?;
        let result = self
            .collection(collection)
            .await?
            .update_one(query, doc! { "$set": set })
            .await
            .map_err(driver_error(collection))?;
        Ok(UpdateSummary {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DatabaseError> {
        let query = filter_document(collection, filter)?;
        let result = self
            .collection(collection)
            .await?
            .delete_one(query)
            .await
            .map_err(driver_error(collection))?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    //! Conversions between JSON documents and BSON.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    fn driver_id_is_dropped_on_read() {
        let stored = doc! {
            "_id": bson::oid::ObjectId::new(),
            "id": "i-1",
            "amount": 12_550_i64,
            "status": "paid",
        };
        let document = from_bson_document(Collection::Invoices, stored).expect("converts");
        assert_eq!(
            Value::Object(document),
            json!({"id": "i-1", "amount": 12_550, "status": "paid"})
        );
    }

    #[rstest]
    fn records_without_id_take_it_from_the_object_id() {
        let oid = bson::oid::ObjectId::new();
        let stored = doc! {
            "_id": oid,
            "customer_id": "c-1",
            "amount": 15_795_i32,
            "status": "pending",
            "date": "2022-12-06",
        };
        let document = from_bson_document(Collection::Invoices, stored).expect("converts");
        assert_eq!(document.get(ID_FIELD), Some(&json!(oid.to_hex())));

        let record: crate::domain::InvoiceRecord =
            serde_json::from_value(Value::Object(document)).expect("decodes as an invoice");
        assert_eq!(record.id.as_ref(), oid.to_hex());
        assert_eq!(record.amount, crate::domain::Cents::new(15_795));
    }

    #[rstest]
    fn users_without_id_decode_with_their_object_id() {
        let oid = bson::oid::ObjectId::new();
        let stored = doc! {
            "_id": oid,
            "name": "User",
            "email": "user@nextmail.com",
            "password": "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy",
        };
        let document = from_bson_document(Collection::Users, stored).expect("converts");
        let user: crate::domain::User =
            serde_json::from_value(Value::Object(document)).expect("decodes as a user");
        assert_eq!(user.id.as_ref(), oid.to_hex());
    }

    #[rstest]
    fn string_native_ids_are_used_when_id_is_missing() {
        let stored = doc! { "_id": "legacy-7", "name": "Lee" };
        let document = from_bson_document(Collection::Customers, stored).expect("converts");
        assert_eq!(document.get(ID_FIELD), Some(&json!("legacy-7")));
    }

    #[rstest]
    fn application_ids_win_over_native_ids() {
        let stored = doc! { "_id": bson::oid::ObjectId::new(), "id": "i-1" };
        let document = from_bson_document(Collection::Invoices, stored).expect("converts");
        assert_eq!(document.get(ID_FIELD), Some(&json!("i-1")));
    }

    #[rstest]
    fn id_filters_also_match_the_object_id() {
        let oid = bson::oid::ObjectId::new();
        let query = filter_document(Collection::Invoices, &Filter::by_id(oid.to_hex())).expect("converts");
        assert_eq!(
            query,
            doc! { "$or": [ { "id": oid.to_hex() }, { "_id": oid } ] }
        );
    }

    #[rstest]
    fn non_hex_id_filters_match_string_native_ids() {
        let query = filter_document(Collection::Invoices, &Filter::by_id("i-1").and("status", "paid"))
            .expect("converts");
        assert_eq!(
            query,
            doc! { "status": "paid", "$or": [ { "id": "i-1" }, { "_id": "i-1" } ] }
        );
    }

    #[rstest]
    fn case_insensitive_filters_become_anchored_regexes() {
        let query = filter_document(
            Collection::Users,
            &Filter::eq_ignore_case("email", "admin+ops@example.com"),
        )
        .expect("converts");
        assert_eq!(
            query,
            doc! { "email": { "$regex": r"^admin\+ops@example\.com$", "$options": "i" } }
        );
    }

    #[rstest]
    fn filters_become_equality_documents() {
        let filter = Filter::eq("email", "a@b.co").and("status", "paid");
        let query = filter_document(Collection::Users, &filter).expect("converts");
        assert_eq!(query, doc! { "email": "a@b.co", "status": "paid" });
    }

    #[rstest]
    fn empty_filter_matches_everything() {
        let query = filter_document(Collection::Customers, &Filter::all()).expect("converts");
        assert!(query.is_empty());
    }

    #[rstest]
    fn json_documents_round_trip_through_bson() {
        let original = object(json!({"id": "c-1", "name": "Lee", "amount": 500}));
        let bson_doc = to_bson_document(Collection::Customers, original.clone()).expect("to bson");
        let back = from_bson_document(Collection::Customers, bson_doc).expect("from bson");
        assert_eq!(back, original);
    }
}
