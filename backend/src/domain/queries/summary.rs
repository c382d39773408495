//! Overview cards, latest invoices, and revenue.

use tracing::error;

use super::DashboardQueries;
use crate::domain::ports::{Collection, CollectionAccessor, Filter};
use crate::domain::{
    CardSummary, Cents, Customer, Error, InvoiceRecord, InvoiceStatus, LatestInvoice, Revenue,
    RevenueChart,
};

/// Entries shown in the latest-invoices card.
pub const LATEST_INVOICES_LIMIT: usize = 5;

impl<A: CollectionAccessor + ?Sized> DashboardQueries<A> {
    /// The `limit` most recent invoices with their customer details.
    pub async fn latest_invoices(&self, limit: usize) -> Result<Vec<LatestInvoice>, Error> {
        let joined = self.joined_invoices("fetch the latest invoices").await?;
        Ok(joined
            .into_iter()
            .take(limit)
            .map(|(invoice, customer)| LatestInvoice {
                id: invoice.id,
                name: customer.name,
                email: customer.email,
                image_url: customer.image_url,
                amount: invoice.amount.format_currency(),
            })
            .collect())
    }

    /// Invoice and customer counts with paid and pending totals.
    pub async fn card_summary(&self) -> Result<CardSummary, Error> {
        let operation = "fetch card data";
        let invoices: Vec<InvoiceRecord> = self
            .load(Collection::Invoices, &Filter::all(), operation)
            .await?;
        let customers: Vec<Customer> = self
            .load(Collection::Customers, &Filter::all(), operation)
            .await?;

        let mut paid = Cents::ZERO;
        let mut pending = Cents::ZERO;
        for invoice in &invoices {
            let total = match invoice.status {
                InvoiceStatus::Paid => &mut paid,
                InvoiceStatus::Pending => &mut pending,
            };
            *total = total.checked_add(invoice.amount).map_err(|err| {
                error!(operation, error = %err, "card totals could not be computed");
                Error::internal(format!("Failed to {operation}."))
            })?;
        }

        Ok(CardSummary {
            number_of_invoices: u64::try_from(invoices.len()).unwrap_or(u64::MAX),
            number_of_customers: u64::try_from(customers.len()).unwrap_or(u64::MAX),
            total_paid_invoices: paid.format_currency(),
            total_pending_invoices: pending.format_currency(),
        })
    }

    /// Monthly revenue rows in stored order.
    pub async fn list_revenue(&self) -> Result<Vec<Revenue>, Error> {
        self.load(Collection::Revenue, &Filter::all(), "fetch revenue data")
            .await
    }

    /// Revenue rows with chart axis labels.
    pub async fn revenue_chart(&self) -> Result<RevenueChart, Error> {
        Ok(RevenueChart::new(self.list_revenue().await?))
    }
}
