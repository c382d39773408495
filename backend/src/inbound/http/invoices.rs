//! Invoice table, edit view, and invoice mutations.
//!
//! ```text
//! GET  /dashboard/invoices?query=&page=
//! GET  /dashboard/invoices/create
//! GET  /dashboard/invoices/{id}
//! POST /dashboard/invoices
//! POST /dashboard/invoices/{id}
//! POST /dashboard/invoices/{id}/delete
//! ```
//!
//! Mutations accept URL-encoded forms and answer with `303 See Other` on
//! success or `422` with the form state when validation fails.
#![deny(missing_docs)]

use actix_web::{HttpResponse, get, post, web};
use futures_util::future::try_join;
use pagination::{Page, PageRequest, parse_page};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Customer, Error, FormInput, INVOICES_PER_PAGE, InvoiceDetail, InvoiceId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::outcome::outcome_response;
use crate::inbound::http::state::HttpState;

/// Query string of the invoices table.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListParams {
    /// Free-text search; empty lists everything.
    #[serde(default)]
    pub query: String,
    /// 1-based page number as typed in the URL.
    pub page: Option<String>,
}

/// Customers offered by the create form.
#[derive(Debug, Serialize)]
pub struct CreateInvoiceView {
    /// Every customer, sorted by name.
    pub customers: Vec<Customer>,
}

/// Invoice and customers for the edit form.
#[derive(Debug, Serialize)]
pub struct EditInvoiceView {
    /// Invoice being edited, amount in dollars.
    pub invoice: InvoiceDetail,
    /// Every customer, sorted by name.
    pub customers: Vec<Customer>,
}

fn invoice_id(raw: String) -> Result<InvoiceId, Error> {
    InvoiceId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "id" }))
    })
}

/// One page of invoices matching the search, with the page links.
#[get("/dashboard/invoices")]
pub async fn list_invoices(
    state: web::Data<HttpState>,
    params: web::Query<InvoiceListParams>,
) -> ApiResult<HttpResponse> {
    let InvoiceListParams { query, page } = params.into_inner();
    let request = PageRequest::new(parse_page(page.as_deref()), INVOICES_PER_PAGE)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let (items, total_pages) = try_join(
        state.queries.list_invoices_page(&query, request),
        state.queries.count_invoice_pages(&query, INVOICES_PER_PAGE),
    )
    .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(Page::new(items, request, total_pages)))
}

/// Customer choices for a new invoice.
#[get("/dashboard/invoices/create")]
pub async fn create_invoice_view(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let customers = state.queries.list_customers().await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(CreateInvoiceView { customers }))
}

/// Invoice detail for the edit form.
#[get("/dashboard/invoices/{id}")]
pub async fn edit_invoice_view(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = invoice_id(path.into_inner())?;
    let (invoice, customers) = try_join(
        state.queries.get_invoice_by_id(&id),
        state.queries.list_customers(),
    )
    .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(EditInvoiceView { invoice, customers }))
}

/// Create an invoice from the submitted form.
///
/// Redirects to the invoices table, or answers `422` with the field errors.
#[post("/dashboard/invoices")]
pub async fn create_invoice(
    state: web::Data<HttpState>,
    form: web::Form<FormInput>,
) -> ApiResult<HttpResponse> {
    let outcome = state.invoices.create(&form).await?;
    Ok(outcome_response(outcome))
}

/// Update customer, amount, and status of an invoice. Its date is kept.
#[post("/dashboard/invoices/{id}")]
pub async fn update_invoice(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    form: web::Form<FormInput>,
) -> ApiResult<HttpResponse> {
    let id = invoice_id(path.into_inner())?;
    let outcome = state.invoices.update(&id, &form).await?;
    Ok(outcome_response(outcome))
}

/// Delete an invoice; an id that is already gone still redirects.
#[post("/dashboard/invoices/{id}/delete")]
pub async fn delete_invoice(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = invoice_id(path.into_inner())?;
    let outcome = state.invoices.delete(&id).await?;
    Ok(outcome_response(outcome))
}
