//! Invoice table, detail lookup, and invoice writes.

use std::cmp::Reverse;
use std::collections::HashMap;

use pagination::{PageRequest, page_count};
use serde_json::json;
use tracing::{info, warn};

use super::{DashboardQueries, decode, encode, failed, needle};
use crate::domain::ports::{Collection, CollectionAccessor, Document, Filter};
use crate::domain::{
    Cents, Customer, CustomerId, Error, InvoiceDetail, InvoiceId, InvoiceRecord, InvoiceRow,
    InvoiceStatus,
};

/// Rows per page in the invoices table.
pub const INVOICES_PER_PAGE: u64 = 6;

fn to_cents(amount: f64, operation: &'static str) -> Result<Cents, Error> {
    match Cents::from_decimal(amount) {
        Ok(cents) if cents.is_positive() => Ok(cents),
        Ok(cents) => {
            warn!(operation, cents = cents.as_i64(), "non-positive invoice amount rejected");
            Err(Error::invalid_request(format!("Failed to {operation}.")))
        }
        Err(err) => {
            warn!(operation, error = %err, "invoice amount rejected");
            Err(Error::invalid_request(format!("Failed to {operation}.")))
        }
    }
}

impl<A: CollectionAccessor + ?Sized> DashboardQueries<A> {
    /// Invoices joined to their customers, newest first.
    ///
    /// Invoices whose customer no longer exists are dropped. Ties on date are
    /// broken by invoice id so paging is stable.
    pub(super) async fn joined_invoices(
        &self,
        operation: &'static str,
    ) -> Result<Vec<(InvoiceRecord, Customer)>, Error> {
        let customers: Vec<Customer> = self
            .load(Collection::Customers, &Filter::all(), operation)
            .await?;
        let by_id: HashMap<CustomerId, Customer> = customers
            .into_iter()
            .map(|customer| (customer.id.clone(), customer))
            .collect();
        let invoices: Vec<InvoiceRecord> = self
            .load(Collection::Invoices, &Filter::all(), operation)
            .await?;

        let mut joined: Vec<(InvoiceRecord, Customer)> = invoices
            .into_iter()
            .filter_map(|invoice| {
                let customer = by_id.get(&invoice.customer_id)?.clone();
                Some((invoice, customer))
            })
            .collect();
        joined.sort_by(|(a, _), (b, _)| (Reverse(a.date), &a.id).cmp(&(Reverse(b.date), &b.id)));
        Ok(joined)
    }

    async fn matching_invoices(
        &self,
        query: &str,
        operation: &'static str,
    ) -> Result<Vec<(InvoiceRecord, Customer)>, Error> {
        let needle = needle(query);
        let mut joined = self.joined_invoices(operation).await?;
        joined.retain(|(invoice, customer)| invoice.matches(customer, &needle));
        Ok(joined)
    }

    /// One page of invoices matching `query`, newest first.
    ///
    /// The query is matched case-insensitively against customer name and
    /// email, the amount as decimal text, the date, and the status.
    pub async fn list_invoices_page(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Vec<InvoiceRow>, Error> {
        let matching = self.matching_invoices(query, "fetch invoices").await?;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(matching
            .iter()
            .skip(skip)
            .take(take)
            .map(|(invoice, customer)| InvoiceRow::join(invoice, customer))
            .collect())
    }

    /// Number of `page_size` pages needed for invoices matching `query`.
    pub async fn count_invoice_pages(&self, query: &str, page_size: u64) -> Result<u64, Error> {
        let matching = self
            .matching_invoices(query, "fetch total number of invoices")
            .await?;
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        Ok(page_count(total, page_size))
    }

    /// Invoice with `id`, with its amount converted back to dollars.
    pub async fn get_invoice_by_id(&self, id: &InvoiceId) -> Result<InvoiceDetail, Error> {
        let operation = "fetch invoice";
        let mut found = self
            .accessor
            .find_many(Collection::Invoices, &Filter::by_id(id.as_ref()))
            .await
            .map_err(failed(operation))?;
        let Some(document) = found.pop() else {
            return Err(Error::not_found("Invoice not found.")
                .with_details(json!({ "id": id.as_ref() })));
        };
        let record: InvoiceRecord =
            decode(Collection::Invoices, document).map_err(failed(operation))?;
        Ok(record.into())
    }

    /// Store a new invoice dated today and return its id.
    pub async fn create_invoice(
        &self,
        customer_id: &CustomerId,
        amount: f64,
        status: InvoiceStatus,
    ) -> Result<InvoiceId, Error> {
        let operation = "create invoice";
        let record = InvoiceRecord {
            id: InvoiceId::random(),
            customer_id: customer_id.clone(),
            amount: to_cents(amount, operation)?,
            status,
            date: self.clock.utc().date_naive(),
        };
        let document = encode(Collection::Invoices, &record).map_err(failed(operation))?;
        let raw_id = self
            .accessor
            .insert_one(Collection::Invoices, document)
            .await
            .map_err(failed(operation))?;
        let id = InvoiceId::new(raw_id)
            .map_err(|err| Error::internal(format!("store returned an invalid id: {err}")))?;
        info!(invoice_id = %id, customer_id = %customer_id, "invoice created");
        Ok(id)
    }

    /// Replace customer, amount, and status on invoice `id`.
    ///
    /// The creation date is left untouched. Fails with `NotFound` when no
    /// invoice has that id.
    pub async fn update_invoice(
        &self,
        id: &InvoiceId,
        customer_id: &CustomerId,
        amount: f64,
        status: InvoiceStatus,
    ) -> Result<(), Error> {
        let operation = "update invoice";
        let mut patch = Document::new();
        patch.insert("customer_id".to_owned(), json!(customer_id.as_ref()));
        patch.insert(
            "amount".to_owned(),
            json!(to_cents(amount, operation)?.as_i64()),
        );
        patch.insert("status".to_owned(), json!(status.as_str()));

        let summary = self
            .accessor
            .update_one(Collection::Invoices, &Filter::by_id(id.as_ref()), patch)
            .await
            .map_err(failed(operation))?;
        if summary.matched == 0 {
            return Err(Error::not_found("Invoice not found.")
                .with_details(json!({ "id": id.as_ref() })));
        }
        info!(invoice_id = %id, "invoice updated");
        Ok(())
    }

    /// Remove invoice `id`. Removing an absent invoice is a no-op.
    pub async fn delete_invoice(&self, id: &InvoiceId) -> Result<(), Error> {
        let deleted = self
            .accessor
            .delete_one(Collection::Invoices, &Filter::by_id(id.as_ref()))
            .await
            .map_err(failed("delete invoice"))?;
        if deleted == 0 {
            info!(invoice_id = %id, "delete requested for absent invoice");
        } else {
            info!(invoice_id = %id, "invoice deleted");
        }
        Ok(())
    }
}
