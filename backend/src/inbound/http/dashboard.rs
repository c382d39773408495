//! Dashboard overview handler.
//!
//! ```text
//! GET /dashboard
//! ```

use actix_web::{HttpResponse, get, web};
use futures_util::future::try_join3;
use serde::Serialize;

use crate::domain::{CardSummary, LATEST_INVOICES_LIMIT, LatestInvoice, RevenueChart};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::state::HttpState;

/// Everything the overview page shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Counts and totals for the headline cards.
    pub cards: CardSummary,
    /// Monthly revenue with its y-axis labels.
    pub revenue: RevenueChart,
    /// Most recent invoices, newest first.
    pub latest_invoices: Vec<LatestInvoice>,
}

/// Cards, revenue chart, and latest invoices, fetched concurrently.
#[get("/dashboard")]
pub async fn overview(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let queries = &state.queries;
    let (cards, revenue, latest_invoices) = try_join3(
        queries.card_summary(),
        queries.revenue_chart(),
        queries.latest_invoices(LATEST_INVOICES_LIMIT),
    )
    .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(DashboardOverview {
            cards,
            revenue,
            latest_invoices,
        }))
}
