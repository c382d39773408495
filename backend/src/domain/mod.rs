//! Domain primitives, queries, and actions.
//!
//! Purpose: Define the strongly typed dashboard entities and the operations
//! the inbound adapters call. Nothing here knows about HTTP or about a
//! particular document store; persistence goes through
//! [`ports::CollectionAccessor`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Cents: integer money with currency formatting.
//! - Customer, InvoiceRecord, User, Revenue and their view rows.
//! - Form validation (`validate`, `FormSchema`, `FieldErrors`, `FormState`).
//! - DashboardQueries, InvoiceActions, RegistrationAction.
//! - CredentialLoginService and RouteGuard for authentication.

pub mod actions;
pub mod auth;
pub mod customer;
pub mod error;
pub mod forms;
pub mod ids;
pub mod invoice;
pub mod login_service;
pub mod money;
pub mod password;
pub mod ports;
pub mod queries;
pub mod revenue;
pub mod route_guard;
pub mod user;

pub use self::actions::{
    ActionOutcome, CREATE_INVOICE_FAILED, INVOICES_PATH, InvoiceActions, REGISTRATION_FAILED,
    RegistrationAction, UPDATE_INVOICE_FAILED,
};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::customer::{Customer, CustomerInvoiceStatus};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::forms::{
    AMOUNT_INVALID, AMOUNT_NOT_POSITIVE, CUSTOMER_REQUIRED, EMAIL_INVALID, FieldErrors,
    FormInput, FormSchema, FormState, InvoiceForm, LoginForm, NAME_REQUIRED, PASSWORD_MIN_LEN,
    PASSWORD_TOO_SHORT, RegistrationForm, STATUS_REQUIRED, validate,
};
pub use self::ids::{CustomerId, IdValidationError, InvoiceId, UserId};
pub use self::invoice::{
    CardSummary, InvoiceDetail, InvoiceRecord, InvoiceRow, InvoiceStatus, LatestInvoice,
    UnknownStatus,
};
pub use self::login_service::CredentialLoginService;
pub use self::money::{Cents, MoneyError};
pub use self::password::{
    PasswordError, PasswordHash, StoredScheme, hash_password, is_password_hash, verify_password,
    verify_stored_password,
};
pub use self::queries::{
    DashboardQueries, HashMigrationReport, INVOICES_PER_PAGE, LATEST_INVOICES_LIMIT,
};
pub use self::revenue::{Revenue, RevenueChart};
pub use self::route_guard::{
    DASHBOARD_PATH, GuardDecision, LOGIN_PATH, REGISTER_PATH, RouteGuard,
};
pub use self::user::{User, normalize_email};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use dashboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
