//! Form-submission actions for invoices and registration.
//!
//! Each action validates its input, checks references against the store,
//! persists, and only then decides where the caller should be sent next.
//! Field problems come back as [`ActionOutcome::Invalid`] so the form can be
//! re-rendered; store failures propagate as [`Error`].

use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::ports::CollectionAccessor;
use crate::domain::queries::{DashboardQueries, DUPLICATE_USER_MESSAGE, is_duplicate_user};
use crate::domain::route_guard::{DASHBOARD_PATH, LOGIN_PATH};
use crate::domain::{
    CUSTOMER_REQUIRED, Error, FieldErrors, FormInput, FormState, InvoiceForm, InvoiceId,
    RegistrationForm, hash_password, validate,
};

/// Invoice table view, the landing page after every invoice mutation.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Summary shown when an invoice cannot be created.
pub const CREATE_INVOICE_FAILED: &str = "Missing Fields. Failed to Create Invoice.";
/// Summary shown when an invoice cannot be updated.
pub const UPDATE_INVOICE_FAILED: &str = "Missing Fields. Failed to Update Invoice.";
/// Summary shown when registration is rejected.
pub const REGISTRATION_FAILED: &str = "Failed to register user.";

/// Result of a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionOutcome {
    /// The write succeeded. Send the caller to `location` after refreshing
    /// every view in `invalidate`.
    Redirect {
        /// Path to navigate to.
        location: String,
        /// Views whose cached data is now stale.
        invalidate: Vec<String>,
    },
    /// Nothing was written. Re-render the form with this state.
    Invalid(FormState),
}

impl ActionOutcome {
    fn redirect(location: &str, invalidate: &[&str]) -> Self {
        Self::Redirect {
            location: location.to_owned(),
            invalidate: invalidate.iter().map(|path| (*path).to_owned()).collect(),
        }
    }

    fn after_invoice_write() -> Self {
        Self::redirect(INVOICES_PATH, &[INVOICES_PATH, DASHBOARD_PATH])
    }
}

/// Create, update, and delete invoices from form submissions.
pub struct InvoiceActions<A: ?Sized> {
    queries: DashboardQueries<A>,
}

impl<A: ?Sized> Clone for InvoiceActions<A> {
    fn clone(&self) -> Self {
        Self {
            queries: self.queries.clone(),
        }
    }
}

impl<A: ?Sized> InvoiceActions<A> {
    /// Actions writing through `queries`.
    pub fn new(queries: DashboardQueries<A>) -> Self {
        Self { queries }
    }
}

impl<A: CollectionAccessor + ?Sized> InvoiceActions<A> {
    /// Validate the form and confirm the selected customer exists.
    async fn checked_form(
        &self,
        input: &FormInput,
        failure: &'static str,
    ) -> Result<Result<InvoiceForm, FormState>, Error> {
        let form = match validate::<InvoiceForm>(input) {
            Ok(form) => form,
            Err(errors) => return Ok(Err(FormState::invalid(failure, errors))),
        };
        if !self.queries.customer_exists(&form.customer_id).await? {
            debug!(customer_id = %form.customer_id, "invoice form names an unknown customer");
            return Ok(Err(FormState::invalid(
                failure,
                FieldErrors::single("customerId", CUSTOMER_REQUIRED),
            )));
        }
        Ok(Ok(form))
    }

    /// Create an invoice dated today.
    pub async fn create(&self, input: &FormInput) -> Result<ActionOutcome, Error> {
        let form = match self.checked_form(input, CREATE_INVOICE_FAILED).await? {
            Ok(form) => form,
            Err(state) => return Ok(ActionOutcome::Invalid(state)),
        };
        let id = self
            .queries
            .create_invoice(&form.customer_id, form.amount, form.status)
            .await?;
        info!(invoice_id = %id, "invoice create action completed");
        Ok(ActionOutcome::after_invoice_write())
    }

    /// Replace customer, amount, and status on invoice `id`.
    ///
    /// An unknown `id` propagates as `NotFound`.
    pub async fn update(&self, id: &InvoiceId, input: &FormInput) -> Result<ActionOutcome, Error> {
        let form = match self.checked_form(input, UPDATE_INVOICE_FAILED).await? {
            Ok(form) => form,
            Err(state) => return Ok(ActionOutcome::Invalid(state)),
        };
        self.queries
            .update_invoice(id, &form.customer_id, form.amount, form.status)
            .await?;
        Ok(ActionOutcome::after_invoice_write())
    }

    /// Delete invoice `id`.
    pub async fn delete(&self, id: &InvoiceId) -> Result<ActionOutcome, Error> {
        self.queries.delete_invoice(id).await?;
        Ok(ActionOutcome::after_invoice_write())
    }
}

/// Register dashboard operators.
pub struct RegistrationAction<A: ?Sized> {
    queries: DashboardQueries<A>,
}

impl<A: ?Sized> Clone for RegistrationAction<A> {
    fn clone(&self) -> Self {
        Self {
            queries: self.queries.clone(),
        }
    }
}

impl<A: ?Sized> RegistrationAction<A> {
    /// Registration writing through `queries`.
    pub fn new(queries: DashboardQueries<A>) -> Self {
        Self { queries }
    }
}

fn duplicate() -> ActionOutcome {
    ActionOutcome::Invalid(FormState::invalid(
        REGISTRATION_FAILED,
        FieldErrors::single("email", DUPLICATE_USER_MESSAGE),
    ))
}

impl<A: CollectionAccessor + ?Sized> RegistrationAction<A> {
    /// Validate, hash the password, and store the user.
    ///
    /// A taken email comes back as a field error on `email`, whether it is
    /// caught by the pre-check or by the insert itself.
    pub async fn register(&self, input: &FormInput) -> Result<ActionOutcome, Error> {
        let form = match validate::<RegistrationForm>(input) {
            Ok(form) => form,
            Err(errors) => {
                return Ok(ActionOutcome::Invalid(FormState::invalid(
                    REGISTRATION_FAILED,
                    errors,
                )));
            }
        };

        if self.queries.get_user_by_email(&form.email).await?.is_some() {
            info!("registration rejected for existing email");
            return Ok(duplicate());
        }

        let hash = hash_password(form.password()).map_err(|err| {
            error!(error = %err, "password hashing failed");
            Error::internal(REGISTRATION_FAILED)
        })?;

        match self
            .queries
            .create_user(&form.name, &form.email, &hash)
            .await
        {
            Ok(_) => Ok(ActionOutcome::redirect(LOGIN_PATH, &[])),
            Err(err) if is_duplicate_user(&err) => Ok(duplicate()),
            Err(err) => Err(err),
        }
    }
}
