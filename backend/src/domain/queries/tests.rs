//! Query behaviour over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use pagination::PageRequest;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockCollectionAccessor;
use crate::domain::{
    Cents, CustomerId, ErrorCode, InvoiceId, InvoiceStatus, hash_password, verify_password,
};
use crate::outbound::persistence::InMemoryCollectionAccessor;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(2024, 3, 15, 10, 30, 0)
            .single()
            .expect("valid instant"),
    })
}

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn customer(id: &str, name: &str, email: &str) -> Document {
    object(json!({
        "id": id,
        "name": name,
        "email": email,
        "image_url": format!("/customers/{id}.png"),
    }))
}

fn invoice(id: &str, customer_id: &str, cents: i64, status: &str, date: &str) -> Document {
    object(json!({
        "id": id,
        "customer_id": customer_id,
        "amount": cents,
        "status": status,
        "date": date,
    }))
}

type Queries = DashboardQueries<InMemoryCollectionAccessor>;

#[fixture]
fn store() -> Arc<InMemoryCollectionAccessor> {
    Arc::new(InMemoryCollectionAccessor::seeded([
        (
            Collection::Customers,
            vec![
                customer("c-1", "Evil Rabbit", "evil@rabbit.com"),
                customer("c-2", "Delba de Oliveira", "delba@oliveira.com"),
                customer("c-3", "Lee Robinson", "lee@robinson.com"),
            ],
        ),
        (
            Collection::Invoices,
            vec![
                invoice("i-1", "c-1", 15_795, "pending", "2022-12-06"),
                invoice("i-2", "c-2", 20_348, "pending", "2022-11-14"),
                invoice("i-3", "c-1", 3_040, "paid", "2022-10-29"),
                invoice("i-4", "c-2", 44_800, "paid", "2023-09-10"),
                invoice("i-5", "c-9", 666, "paid", "2023-01-01"),
                invoice("i-6", "c-1", 12_550, "paid", "2022-12-06"),
            ],
        ),
        (
            Collection::Revenue,
            vec![
                object(json!({"month": "Jan", "revenue": 2000.0})),
                object(json!({"month": "Feb", "revenue": 4700.0})),
            ],
        ),
    ]))
}

fn queries(store: &Arc<InMemoryCollectionAccessor>) -> Queries {
    DashboardQueries::new(Arc::clone(store), fixture_clock())
}

fn ids(rows: &[crate::domain::InvoiceRow]) -> Vec<&str> {
    rows.iter().map(|row| row.id.as_ref()).collect()
}

fn page(number: u64, size: u64) -> PageRequest {
    PageRequest::new(number, size).expect("valid page")
}

#[rstest]
#[tokio::test]
async fn invoice_table_joins_customers_newest_first(store: Arc<InMemoryCollectionAccessor>) {
    let rows = queries(&store)
        .list_invoices_page("", page(1, 10))
        .await
        .expect("rows");

    // i-5 references a customer that does not exist.
    assert_eq!(ids(&rows), ["i-4", "i-1", "i-6", "i-2", "i-3"]);
    let first = &rows[0];
    assert_eq!(first.name, "Delba de Oliveira");
    assert_eq!(first.email, "delba@oliveira.com");
    assert_eq!(first.amount, "$448.00");
    assert_eq!(first.status, InvoiceStatus::Paid);
}

#[rstest]
#[case("DELBA", &["i-4", "i-2"])]
#[case("rabbit.com", &["i-1", "i-6", "i-3"])]
#[case("125.5", &["i-6"])]
#[case("2022-12", &["i-1", "i-6"])]
#[case("pending", &["i-1", "i-2"])]
#[case("  Paid ", &["i-4", "i-6", "i-3"])]
#[case("nothing matches this", &[])]
#[tokio::test]
async fn invoice_search_covers_every_searchable_field(
    store: Arc<InMemoryCollectionAccessor>,
    #[case] query: &str,
    #[case] expected: &[&str],
) {
    let rows = queries(&store)
        .list_invoices_page(query, page(1, 10))
        .await
        .expect("rows");
    assert_eq!(ids(&rows), expected);
}

#[rstest]
#[tokio::test]
async fn pages_partition_results_without_overlap(store: Arc<InMemoryCollectionAccessor>) {
    let queries = queries(&store);
    let first = queries.list_invoices_page("", page(1, 2)).await.expect("page 1");
    let second = queries.list_invoices_page("", page(2, 2)).await.expect("page 2");
    let third = queries.list_invoices_page("", page(3, 2)).await.expect("page 3");
    let beyond = queries.list_invoices_page("", page(4, 2)).await.expect("page 4");

    assert_eq!(ids(&first), ["i-4", "i-1"]);
    assert_eq!(ids(&second), ["i-6", "i-2"]);
    assert_eq!(ids(&third), ["i-3"]);
    assert!(beyond.is_empty());
}

#[rstest]
#[case("", 6, 1)]
#[case("", 2, 3)]
#[case("paid", 2, 2)]
#[case("nothing matches this", 6, 0)]
#[tokio::test]
async fn page_count_follows_matching_rows(
    store: Arc<InMemoryCollectionAccessor>,
    #[case] query: &str,
    #[case] size: u64,
    #[case] expected: u64,
) {
    let pages = queries(&store)
        .count_invoice_pages(query, size)
        .await
        .expect("count");
    assert_eq!(pages, expected);
}

#[rstest]
#[tokio::test]
async fn invoice_detail_converts_cents_to_dollars(store: Arc<InMemoryCollectionAccessor>) {
    let detail = queries(&store)
        .get_invoice_by_id(&InvoiceId::new("i-6").expect("id"))
        .await
        .expect("detail");
    assert!((detail.amount - 125.5).abs() < f64::EPSILON);
    assert_eq!(detail.customer_id.as_ref(), "c-1");
    assert_eq!(detail.status, InvoiceStatus::Paid);
}

#[rstest]
#[tokio::test]
async fn missing_invoice_is_not_found(store: Arc<InMemoryCollectionAccessor>) {
    let err = queries(&store)
        .get_invoice_by_id(&InvoiceId::new("missing").expect("id"))
        .await
        .expect_err("absent");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.details(), Some(&json!({"id": "missing"})));
}

#[rstest]
#[tokio::test]
async fn create_stores_cents_and_todays_date(store: Arc<InMemoryCollectionAccessor>) {
    let id = queries(&store)
        .create_invoice(
            &CustomerId::new("c-3").expect("id"),
            125.50,
            InvoiceStatus::Pending,
        )
        .await
        .expect("created");

    let stored = store
        .find_many(Collection::Invoices, &Filter::by_id(id.as_ref()))
        .await
        .expect("find");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get("amount"), Some(&json!(12_550)));
    assert_eq!(stored[0].get("date"), Some(&json!("2024-03-15")));
    assert_eq!(stored[0].get("status"), Some(&json!("pending")));
    assert_eq!(stored[0].get("customer_id"), Some(&json!("c-3")));
}

#[rstest]
#[case(0.0)]
#[case(-3.0)]
#[case(0.004)]
#[case(f64::NAN)]
#[tokio::test]
async fn create_rejects_amounts_that_are_not_positive_cents(
    store: Arc<InMemoryCollectionAccessor>,
    #[case] amount: f64,
) {
    let err = queries(&store)
        .create_invoice(
            &CustomerId::new("c-1").expect("id"),
            amount,
            InvoiceStatus::Paid,
        )
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(store.documents(Collection::Invoices).await.len(), 6);
}

#[rstest]
#[tokio::test]
async fn update_changes_fields_but_keeps_the_date(store: Arc<InMemoryCollectionAccessor>) {
    let queries = queries(&store);
    let id = InvoiceId::new("i-2").expect("id");
    queries
        .update_invoice(
            &id,
            &CustomerId::new("c-3").expect("id"),
            99.99,
            InvoiceStatus::Paid,
        )
        .await
        .expect("updated");

    let detail = queries.get_invoice_by_id(&id).await.expect("detail");
    assert_eq!(detail.customer_id.as_ref(), "c-3");
    assert!((detail.amount - 99.99).abs() < 1e-9);
    assert_eq!(detail.status, InvoiceStatus::Paid);
    assert_eq!(
        detail.date,
        NaiveDate::from_ymd_opt(2022, 11, 14).expect("date")
    );
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_invoice_is_not_found(store: Arc<InMemoryCollectionAccessor>) {
    let err = queries(&store)
        .update_invoice(
            &InvoiceId::new("missing").expect("id"),
            &CustomerId::new("c-1").expect("id"),
            10.0,
            InvoiceStatus::Paid,
        )
        .await
        .expect_err("absent");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_is_idempotent(store: Arc<InMemoryCollectionAccessor>) {
    let queries = queries(&store);
    let id = InvoiceId::new("i-1").expect("id");
    queries.delete_invoice(&id).await.expect("first delete");
    queries.delete_invoice(&id).await.expect("second delete");
    assert_eq!(store.documents(Collection::Invoices).await.len(), 5);
}

#[rstest]
#[tokio::test]
async fn card_summary_counts_and_sums_every_invoice(store: Arc<InMemoryCollectionAccessor>) {
    let summary = queries(&store).card_summary().await.expect("summary");
    assert_eq!(summary.number_of_invoices, 6);
    assert_eq!(summary.number_of_customers, 3);
    assert_eq!(summary.total_paid_invoices, "$610.56");
    assert_eq!(summary.total_pending_invoices, "$361.43");
}

/// Count and per-status cent sums for `customer_id`, straight from the raw
/// invoice documents.
fn reference_totals(invoices: &[Document], customer_id: &str) -> (u64, String, String) {
    let own: Vec<&Document> = invoices
        .iter()
        .filter(|invoice| invoice.get("customer_id").and_then(Value::as_str) == Some(customer_id))
        .collect();
    let sum_for = |status: &str| {
        let cents: i64 = own
            .iter()
            .filter(|invoice| invoice.get("status").and_then(Value::as_str) == Some(status))
            .filter_map(|invoice| invoice.get("amount").and_then(Value::as_i64))
            .sum();
        Cents::new(cents).format_currency()
    };
    let count = u64::try_from(own.len()).expect("count fits in u64");
    (count, sum_for("pending"), sum_for("paid"))
}

async fn assert_totals_match_reference(store: &Arc<InMemoryCollectionAccessor>) {
    let invoices = store.documents(Collection::Invoices).await;
    let customers = store.documents(Collection::Customers).await;
    let rows = queries(store)
        .list_customers_with_invoice_totals()
        .await
        .expect("rows");

    assert_eq!(rows.len(), customers.len());
    for row in &rows {
        let (count, pending, paid) = reference_totals(&invoices, row.id.as_ref());
        assert_eq!(row.total_invoices, count, "count for {}", row.id);
        assert_eq!(row.total_pending, pending, "pending for {}", row.id);
        assert_eq!(row.total_paid, paid, "paid for {}", row.id);
    }
}

/// Deterministic spread of invoices over five customers, with every sixth
/// customer reference left dangling.
fn generated_store(invoice_count: i64) -> Arc<InMemoryCollectionAccessor> {
    let customers = (0..5)
        .map(|n| customer(&format!("c-{n}"), &format!("Customer {n}"), &format!("c{n}@example.com")))
        .collect();
    let invoices = (0..invoice_count)
        .map(|n| {
            let owner = match (n * 31) % 6 {
                5 => "c-missing".to_owned(),
                index => format!("c-{index}"),
            };
            let status = if n % 3 == 0 { "paid" } else { "pending" };
            let cents = (n * 7_919) % 250_000 + 1;
            let date = format!("2023-{:02}-{:02}", n % 12 + 1, n % 28 + 1);
            invoice(&format!("i-{n}"), &owner, cents, status, &date)
        })
        .collect();
    Arc::new(InMemoryCollectionAccessor::seeded([
        (Collection::Customers, customers),
        (Collection::Invoices, invoices),
    ]))
}

#[rstest]
#[tokio::test]
async fn customer_totals_sum_cents_per_status(store: Arc<InMemoryCollectionAccessor>) {
    assert_totals_match_reference(&store).await;

    let rows = queries(&store)
        .list_customers_with_invoice_totals()
        .await
        .expect("rows");
    let lee = rows
        .iter()
        .find(|row| row.id.as_ref() == "c-3")
        .expect("customer without invoices is listed");
    assert_eq!(
        (lee.total_invoices, lee.total_pending.as_str(), lee.total_paid.as_str()),
        (0, "$0.00", "$0.00")
    );
}

#[rstest]
#[case(0)]
#[case(7)]
#[case(240)]
#[tokio::test]
async fn customer_totals_agree_with_a_per_customer_filter(#[case] invoice_count: i64) {
    assert_totals_match_reference(&generated_store(invoice_count)).await;
}

#[rstest]
#[tokio::test]
async fn customer_search_matches_name_or_email(store: Arc<InMemoryCollectionAccessor>) {
    let queries = queries(&store);
    let by_name = queries.search_customers("LEE").await.expect("rows");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id.as_ref(), "c-3");

    let by_email = queries.search_customers("oliveira.com").await.expect("rows");
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].total_invoices, 2);
}

#[rstest]
#[tokio::test]
async fn customers_are_listed_by_name(store: Arc<InMemoryCollectionAccessor>) {
    let names: Vec<String> = queries(&store)
        .list_customers()
        .await
        .expect("customers")
        .into_iter()
        .map(|customer| customer.name)
        .collect();
    assert_eq!(names, ["Delba de Oliveira", "Evil Rabbit", "Lee Robinson"]);
}

#[rstest]
#[case("c-1", true)]
#[case("c-9", false)]
#[tokio::test]
async fn customer_existence(
    store: Arc<InMemoryCollectionAccessor>,
    #[case] id: &str,
    #[case] expected: bool,
) {
    let exists = queries(&store)
        .customer_exists(&CustomerId::new(id).expect("id"))
        .await
        .expect("lookup");
    assert_eq!(exists, expected);
}

#[rstest]
#[tokio::test]
async fn latest_invoices_are_limited_and_ordered(store: Arc<InMemoryCollectionAccessor>) {
    let latest = queries(&store).latest_invoices(3).await.expect("latest");
    let ids: Vec<&str> = latest.iter().map(|row| row.id.as_ref()).collect();
    assert_eq!(ids, ["i-4", "i-1", "i-6"]);
    assert_eq!(latest[2].amount, "$125.50");
}

#[rstest]
#[tokio::test]
async fn revenue_chart_scales_to_the_next_thousand(store: Arc<InMemoryCollectionAccessor>) {
    let chart = queries(&store).revenue_chart().await.expect("chart");
    assert_eq!(chart.revenue.len(), 2);
    assert_eq!(chart.top_label, 5000);
    assert_eq!(chart.y_axis_labels.first().map(String::as_str), Some("$5K"));
    assert_eq!(chart.y_axis_labels.last().map(String::as_str), Some("$0K"));
}

#[rstest]
#[tokio::test]
async fn users_are_stored_with_hashes_and_rejected_when_duplicated(
    store: Arc<InMemoryCollectionAccessor>,
) {
    let queries = queries(&store);
    let hash = hash_password("123456").expect("hash");
    let id = queries
        .create_user("  Ada  ", " Ada@Example.com ", &hash)
        .await
        .expect("created");

    let user = queries
        .get_user_by_email("ada@example.com")
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(user.id, id);
    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");
    assert_ne!(user.stored_password(), "123456");
    let stored = crate::domain::PasswordHash::parse(user.stored_password()).expect("phc");
    assert_eq!(verify_password("123456", &stored), Ok(true));
    assert_eq!(
        user.created_at.map(|at| at.to_rfc3339()),
        Some("2024-03-15T10:30:00+00:00".to_owned())
    );

    let err = queries
        .create_user("Other", "ADA@example.com", &hash)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert!(is_duplicate_user(&err));
    assert_eq!(store.documents(Collection::Users).await.len(), 1);
}

#[rstest]
#[case("Admin@Example.com")]
#[case("admin@example.com")]
#[case(" ADMIN@EXAMPLE.COM ")]
#[tokio::test]
async fn users_stored_with_mixed_case_are_found_and_protected(#[case] lookup: &str) {
    let hash = hash_password("123456").expect("hash");
    let store = Arc::new(InMemoryCollectionAccessor::seeded([(
        Collection::Users,
        vec![object(json!({
            "id": "u-admin",
            "name": "Admin",
            "email": "Admin@Example.com",
            "password": hash.as_str(),
        }))],
    )]));
    let queries = queries(&store);

    let user = queries
        .get_user_by_email(lookup)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(user.id.as_ref(), "u-admin");

    let err = queries
        .create_user("Second Admin", lookup, &hash)
        .await
        .expect_err("duplicate");
    assert!(is_duplicate_user(&err));
    assert_eq!(store.documents(Collection::Users).await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn unknown_email_has_no_user(store: Arc<InMemoryCollectionAccessor>) {
    let user = queries(&store)
        .get_user_by_email("nobody@example.com")
        .await
        .expect("lookup");
    assert!(user.is_none());
}

#[rstest]
#[case(DatabaseError::connection(Collection::Invoices, "refused"), ErrorCode::ServiceUnavailable)]
#[case(DatabaseError::query(Collection::Invoices, "bad query"), ErrorCode::InternalError)]
#[tokio::test]
async fn store_failures_name_the_operation(
    #[case] failure: DatabaseError,
    #[case] expected: ErrorCode,
) {
    let mut accessor = MockCollectionAccessor::new();
    accessor
        .expect_find_many()
        .returning(move |_, _| Err(failure.clone()));
    let queries = DashboardQueries::new(Arc::new(accessor), fixture_clock());

    let err = queries
        .count_invoice_pages("", 6)
        .await
        .expect_err("store down");
    assert_eq!(err.code(), expected);
    assert_eq!(err.message(), "Failed to fetch total number of invoices.");

    let err = queries.card_summary().await.expect_err("store down");
    assert_eq!(err.message(), "Failed to fetch card data.");
}

#[rstest]
#[tokio::test]
async fn undecodable_documents_are_internal_errors() {
    let store = InMemoryCollectionAccessor::seeded([(
        Collection::Invoices,
        vec![object(json!({"id": "i-1", "amount": "lots"}))],
    )]);
    let queries = DashboardQueries::new(Arc::new(store), fixture_clock());
    let err = queries
        .get_invoice_by_id(&InvoiceId::new("i-1").expect("id"))
        .await
        .expect_err("bad document");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Failed to fetch invoice.");
}
