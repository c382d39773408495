//! Customer records and the per-customer invoice aggregate.

use serde::{Deserialize, Serialize};

use super::CustomerId;

/// A customer as stored in the `customers` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Application identifier referenced by invoices.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Avatar path or URL.
    #[serde(default)]
    pub image_url: String,
}

impl Customer {
    /// Case-insensitive substring match on name or email.
    ///
    /// `needle` must already be lower-cased; an empty needle matches.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }
}

/// Customer row for the customers table: contact details plus invoice totals.
///
/// Totals are formatted currency strings computed from summed cents. Fields
/// serialise with their snake_case names, as the invoice rows do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInvoiceStatus {
    /// Customer identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Avatar path or URL.
    pub image_url: String,
    /// Number of invoices referencing the customer.
    pub total_invoices: u64,
    /// Sum of pending invoice amounts, e.g. `$1,234.56`.
    pub total_pending: String,
    /// Sum of paid invoice amounts.
    pub total_paid: String,
}
