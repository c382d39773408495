//! Seed data shared by integration tests.

use std::sync::Arc;

use dashboard::domain::hash_password;
use dashboard::domain::ports::{Collection, Document};
use dashboard::outbound::persistence::InMemoryCollectionAccessor;
use serde_json::{Value, json};

pub const OPERATOR_EMAIL: &str = "user@nextmail.com";
pub const OPERATOR_PASSWORD: &str = "123456";

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Store holding one operator, three customers, a page and a half of
/// invoices, and two months of revenue.
pub fn seeded_store() -> Arc<InMemoryCollectionAccessor> {
    let hash = hash_password(OPERATOR_PASSWORD).expect("hash fixture password");
    let customers = [
        ("c-1", "Evil Rabbit", "evil@rabbit.com"),
        ("c-2", "Delba de Oliveira", "delba@oliveira.com"),
        ("c-3", "Lee Robinson", "lee@robinson.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| {
        object(json!({
            "id": id,
            "name": name,
            "email": email,
            "image_url": format!("/customers/{id}.png"),
        }))
    })
    .collect();
    let invoices = (1..=8)
        .map(|n: i64| {
            let customer = format!("c-{}", (n % 3) + 1);
            let status = if n % 2 == 0 { "paid" } else { "pending" };
            object(json!({
                "id": format!("i-{n}"),
                "customer_id": customer,
                "amount": n * 1_000,
                "status": status,
                "date": format!("2023-0{n}-01"),
            }))
        })
        .collect();

    Arc::new(InMemoryCollectionAccessor::seeded([
        (Collection::Customers, customers),
        (Collection::Invoices, invoices),
        (
            Collection::Revenue,
            vec![
                object(json!({"month": "Jan", "revenue": 2000.0})),
                object(json!({"month": "Feb", "revenue": 4700.0})),
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
