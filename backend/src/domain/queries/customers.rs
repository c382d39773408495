//! Customer listings and the per-customer invoice aggregate.

use std::collections::HashMap;

use tracing::error;

use super::{DashboardQueries, failed, needle};
use crate::domain::ports::{Collection, CollectionAccessor, Filter};
use crate::domain::{
    Cents, Customer, CustomerId, CustomerInvoiceStatus, Error, InvoiceRecord, InvoiceStatus,
    MoneyError,
};

const CUSTOMER_TABLE: &str = "fetch customer table";

#[derive(Default)]
struct Totals {
    count: u64,
    pending: Cents,
    paid: Cents,
}

impl Totals {
    fn add(&mut self, invoice: &InvoiceRecord) -> Result<(), MoneyError> {
        self.count += 1;
        match invoice.status {
            InvoiceStatus::Pending => self.pending = self.pending.checked_add(invoice.amount)?,
            InvoiceStatus::Paid => self.paid = self.paid.checked_add(invoice.amount)?,
        }
        Ok(())
    }
}

fn overflow(operation: &'static str) -> impl Fn(MoneyError) -> Error {
    move |err| {
        error!(operation, error = %err, "invoice totals could not be computed");
        Error::internal(format!("Failed to {operation}."))
    }
}

impl<A: CollectionAccessor + ?Sized> DashboardQueries<A> {
    /// All customers, sorted by name.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, Error> {
        let mut customers: Vec<Customer> = self
            .load(Collection::Customers, &Filter::all(), "fetch all customers")
            .await?;
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    /// Every customer with invoice count and pending/paid totals, sorted by
    /// name.
    pub async fn list_customers_with_invoice_totals(
        &self,
    ) -> Result<Vec<CustomerInvoiceStatus>, Error> {
        self.search_customers("").await
    }

    /// Customers whose name or email contains `query` (case-insensitive),
    /// with their invoice aggregate.
    pub async fn search_customers(&self, query: &str) -> Result<Vec<CustomerInvoiceStatus>, Error> {
        let needle = needle(query);
        let mut customers: Vec<Customer> = self
            .load(Collection::Customers, &Filter::all(), CUSTOMER_TABLE)
            .await?;
        customers.retain(|customer| customer.matches(&needle));
        customers.sort_by(|a, b| a.name.cmp(&b.name));

        let invoices: Vec<InvoiceRecord> = self
            .load(Collection::Invoices, &Filter::all(), CUSTOMER_TABLE)
            .await?;
        let mut totals: HashMap<&CustomerId, Totals> = HashMap::new();
        for invoice in &invoices {
            totals
                .entry(&invoice.customer_id)
                .or_default()
                .add(invoice)
                .map_err(overflow(CUSTOMER_TABLE))?;
        }

        Ok(customers
            .into_iter()
            .map(|customer| {
                let Totals {
                    count,
                    pending,
                    paid,
                } = totals.remove(&customer.id).unwrap_or_default();
                CustomerInvoiceStatus {
                    id: customer.id,
                    name: customer.name,
                    email: customer.email,
                    image_url: customer.image_url,
                    total_invoices: count,
                    total_pending: pending.format_currency(),
                    total_paid: paid.format_currency(),
                }
            })
            .collect())
    }

    /// Whether a customer with `id` exists.
    pub async fn customer_exists(&self, id: &CustomerId) -> Result<bool, Error> {
        let found = self
            .accessor
            .find_many(Collection::Customers, &Filter::by_id(id.as_ref()))
            .await
            .map_err(failed("fetch customer"))?;
        Ok(!found.is_empty())
    }
}
