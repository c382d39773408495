//! Invoice records and the read models derived from them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, Customer, CustomerId, InvoiceId};

/// Payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Issued but not yet paid.
    Pending,
    /// Settled.
    Paid,
}

impl InvoiceStatus {
    /// Stored string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown invoice status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// An invoice as stored in the `invoices` collection.
///
/// ## Invariants
/// - `amount` is whole cents and positive for every invoice written through
///   the mutation actions.
/// - `date` is the creation day and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Application identifier.
    pub id: InvoiceId,
    /// Customer the invoice bills.
    pub customer_id: CustomerId,
    /// Amount in cents.
    pub amount: Cents,
    /// Payment status.
    pub status: InvoiceStatus,
    /// Creation day, serialised as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl InvoiceRecord {
    /// Case-insensitive substring match across the invoice and its customer.
    ///
    /// Searched fields: customer name, customer email, amount as decimal text
    /// (`125.50`), ISO date, and status. `needle` must be lower-cased.
    pub fn matches(&self, customer: &Customer, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        customer.matches(needle)
            || self.amount.decimal_text().contains(needle)
            || self.date.to_string().contains(needle)
            || self.status.as_str().contains(needle)
    }
}

/// Invoice row shown in the paginated invoices table.
///
/// Serialised with the stored field names (`customer_id`, `image_url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRow {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Customer identifier.
    pub customer_id: CustomerId,
    /// Customer name.
    pub name: String,
    /// Customer email.
    pub email: String,
    /// Customer avatar.
    pub image_url: String,
    /// Creation day.
    pub date: NaiveDate,
    /// Formatted amount, e.g. `$125.50`.
    pub amount: String,
    /// Payment status.
    pub status: InvoiceStatus,
}

impl InvoiceRow {
    /// Denormalise an invoice with its customer.
    pub fn join(invoice: &InvoiceRecord, customer: &Customer) -> Self {
        Self {
            id: invoice.id.clone(),
            customer_id: customer.id.clone(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            image_url: customer.image_url.clone(),
            date: invoice.date,
            amount: invoice.amount.format_currency(),
            status: invoice.status,
        }
    }
}

/// Invoice prepared for the edit form, with the amount back in dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetail {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Customer identifier.
    pub customer_id: CustomerId,
    /// Amount as a decimal, e.g. `125.5`.
    pub amount: f64,
    /// Payment status.
    pub status: InvoiceStatus,
    /// Creation day.
    pub date: NaiveDate,
}

impl From<InvoiceRecord> for InvoiceDetail {
    fn from(record: InvoiceRecord) -> Self {
        Self {
            id: record.id,
            customer_id: record.customer_id,
            amount: record.amount.to_decimal(),
            status: record.status,
            date: record.date,
        }
    }
}

/// Entry in the "latest invoices" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestInvoice {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Customer name.
    pub name: String,
    /// Customer email.
    pub email: String,
    /// Customer avatar.
    pub image_url: String,
    /// Formatted amount.
    pub amount: String,
}

/// Headline numbers for the dashboard cards, serialised in camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    /// Total number of invoices.
    pub number_of_invoices: u64,
    /// Total number of customers.
    pub number_of_customers: u64,
    /// Formatted sum of paid invoices.
    pub total_paid_invoices: String,
    /// Formatted sum of pending invoices.
    pub total_pending_invoices: String,
}
