//! Customers table handler.
//!
//! ```text
//! GET /dashboard/customers?query=
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::state::HttpState;

/// Query string of the customers table.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerSearchParams {
    /// Name or email fragment; empty lists everyone.
    #[serde(default)]
    pub query: String,
}

/// Customers matching the search with their invoice totals.
#[get("/dashboard/customers")]
pub async fn list_customers(
    state: web::Data<HttpState>,
    params: web::Query<CustomerSearchParams>,
) -> ApiResult<HttpResponse> {
    let customers = state.queries.search_customers(&params.query).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(customers))
}
