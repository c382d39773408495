//! HTTP inbound adapter exposing the dashboard endpoints.

pub mod cache_control;
pub mod customers;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod invoices;
pub mod outcome;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every dashboard and account handler.
///
/// Handlers expect [`state::HttpState`] in app data and a session middleware
/// around them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard::overview)
        .service(invoices::list_invoices)
        // Literal path first so it is not captured by `{id}`.
        .service(invoices::create_invoice_view)
        .service(invoices::edit_invoice_view)
        .service(invoices::create_invoice)
        .service(invoices::update_invoice)
        .service(invoices::delete_invoice)
        .service(customers::list_customers)
        .service(users::login)
        .service(users::register)
        .service(users::logout);
}
