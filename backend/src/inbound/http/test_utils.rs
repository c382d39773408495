//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use mockable::DefaultClock;
use serde_json::{Value, json};

use crate::domain::hash_password;
use crate::domain::ports::{Collection, Document};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::InMemoryCollectionAccessor;

/// Email of the seeded operator.
pub const OPERATOR_EMAIL: &str = "user@nextmail.com";
/// Password of the seeded operator.
pub const OPERATOR_PASSWORD: &str = "123456";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Store with two customers, three invoices, revenue rows, and one operator
/// whose password is hashed.
pub fn seeded_store() -> Arc<InMemoryCollectionAccessor> {
    let hash = hash_password(OPERATOR_PASSWORD).expect("hash fixture password");
    Arc::new(InMemoryCollectionAccessor::seeded([
        (
            Collection::Customers,
            vec![
                object(json!({
                    "id": "c-1",
                    "name": "Amy Burns",
                    "email": "amy@burns.com",
                    "image_url": "/customers/amy-burns.png",
                })),
                object(json!({
                    "id": "c-2",
                    "name": "Balazs Orban",
                    "email": "balazs@orban.com",
                    "image_url": "/customers/balazs-orban.png",
                })),
            ],
        ),
        (
            Collection::Invoices,
            vec![
                object(json!({
                    "id": "i-1", "customer_id": "c-1", "amount": 15_795,
                    "status": "pending", "date": "2022-12-06",
                })),
                object(json!({
                    "id": "i-2", "customer_id": "c-2", "amount": 20_348,
                    "status": "pending", "date": "2022-11-14",
                })),
                object(json!({
                    "id": "i-3", "customer_id": "c-1", "amount": 3_040,
                    "status": "paid", "date": "2022-10-29",
                })),
            ],
        ),
        (
            Collection::Revenue,
            vec![
                object(json!({"month": "Jan", "revenue": 2000.0})),
                object(json!({"month": "Feb", "revenue": 1800.0})),
            ],
        ),
        (
            Collection::Users,
            vec![object(json!({
                "id": "410544b2-4001-4271-9855-fec4b6a6442a",
                "name": "User",
                "email": OPERATOR_EMAIL,
                "password": hash.as_str(),
            }))],
        ),
    ]))
}

/// HTTP state over `store`.
pub fn state_for(store: &Arc<InMemoryCollectionAccessor>) -> HttpState {
    HttpState::from_accessor(Arc::clone(store) as _, Arc::new(DefaultClock))
}
