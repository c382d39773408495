//! Form validation.
//!
//! Each form kind is a type implementing [`FormSchema`]. [`validate`] turns the
//! raw submitted fields into that type or into a [`FieldErrors`] map keyed by
//! the submitted field name. Validation never panics and never produces a
//! domain [`crate::domain::Error`]: field problems are data, returned to the
//! caller so the form can be re-rendered.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Cents, CustomerId, InvoiceStatus, LoginCredentials, normalize_email};

/// Minimum password length accepted at registration and login.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Message for a blank name.
pub const NAME_REQUIRED: &str = "Please enter your name.";
/// Message for a malformed email.
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
/// Message for a short password.
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long.";
/// Message for a missing customer selection.
pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
/// Message for a zero or negative amount.
pub const AMOUNT_NOT_POSITIVE: &str = "Please enter an amount greater than $0.";
/// Message for an amount that is not a number.
pub const AMOUNT_INVALID: &str = "Please enter a valid amount.";
/// Message for a missing or unknown status.
pub const STATUS_REQUIRED: &str = "Please select an invoice status.";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Raw submitted form fields.
///
/// Deserialises from URL-encoded or JSON objects of string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput(BTreeMap<String, String>);

impl FormInput {
    /// Build an input from field/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Submitted value for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Submitted value for `field`, treating blank values as absent.
    pub fn non_blank(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|value| !value.trim().is_empty())
    }
}

/// Validation messages keyed by field name.
///
/// Serialises as `{ "field": ["message", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record `message` against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Single-message map, used for store-side checks such as duplicates.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Whether no messages were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names with at least one message.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

/// State returned to a form after a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Summary message shown above the form.
    pub message: Option<String>,
    /// Per-field messages.
    pub errors: FieldErrors,
}

impl FormState {
    /// Build a state from a summary message and field errors.
    pub fn invalid(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            message: Some(message.into()),
            errors,
        }
    }
}

/// A form kind that can be validated from raw input.
pub trait FormSchema: Sized {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Parse and validate every field, collecting all problems.
    fn from_input(input: &FormInput) -> Result<Self, FieldErrors>;
}

/// Validate `input` against the schema `S`.
///
/// # Examples
/// ```
/// use dashboard::domain::{FormInput, InvoiceForm, validate};
///
/// let input = FormInput::from_pairs([("customerId", "c-1"), ("amount", "0"), ("status", "paid")]);
/// let errors = validate::<InvoiceForm>(&input).unwrap_err();
/// assert_eq!(errors.get("amount"), ["Please enter an amount greater than $0."]);
/// ```
pub fn validate<S: FormSchema>(input: &FormInput) -> Result<S, FieldErrors> {
    S::from_input(input).inspect_err(|errors| {
        let fields: Vec<&str> = errors.fields().collect();
        tracing::debug!(form = S::NAME, ?fields, "form validation failed");
    })
}

fn check_email(input: &FormInput, errors: &mut FieldErrors) -> Option<String> {
    let email = input.get("email").map(normalize_email).unwrap_or_default();
    if email_regex().is_match(&email) {
        Some(email)
    } else {
        errors.add("email", EMAIL_INVALID);
        None
    }
}

fn check_password(input: &FormInput, errors: &mut FieldErrors) -> Option<Zeroizing<String>> {
    let password = input.get("password").unwrap_or_default();
    if password.chars().count() >= PASSWORD_MIN_LEN {
        Some(Zeroizing::new(password.to_owned()))
    } else {
        errors.add("password", PASSWORD_TOO_SHORT);
        None
    }
}

/// Registration form: `name`, `email`, `password`.
#[derive(Clone)]
pub struct RegistrationForm {
    /// Trimmed display name.
    pub name: String,
    /// Normalised email.
    pub email: String,
    password: Zeroizing<String>,
}

impl RegistrationForm {
    /// Plaintext password, wiped on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl FormSchema for RegistrationForm {
    const NAME: &'static str = "registration";

    fn from_input(input: &FormInput) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = input.non_blank("name").map(|name| name.trim().to_owned());
        if name.is_none() {
            errors.add("name", NAME_REQUIRED);
        }
        let email = check_email(input, &mut errors);
        let password = check_password(input, &mut errors);
        errors.into_result(|| {
            Some(Self {
                name: name?,
                email: email?,
                password: password?,
            })
        })
    }
}

/// Invoice form used by both create and update: `customerId`, `amount`,
/// `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceForm {
    /// Selected customer.
    pub customer_id: CustomerId,
    /// Amount as entered, in dollars. Always finite and at least one cent
    /// once rounded.
    pub amount: f64,
    /// Selected status.
    pub status: InvoiceStatus,
}

fn check_amount(raw: Option<&str>) -> Result<f64, &'static str> {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(AMOUNT_NOT_POSITIVE);
    }
    let value: f64 = text.parse().map_err(|_| AMOUNT_INVALID)?;
    let cents = Cents::from_decimal(value).map_err(|_| AMOUNT_INVALID)?;
    if cents.is_positive() {
        Ok(value)
    } else {
        Err(AMOUNT_NOT_POSITIVE)
    }
}

impl FormSchema for InvoiceForm {
    const NAME: &'static str = "invoice";

    fn from_input(input: &FormInput) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();

        let customer_id = input
            .non_blank("customerId")
            .and_then(|raw| CustomerId::new(raw.trim()).ok());
        if customer_id.is_none() {
            errors.add("customerId", CUSTOMER_REQUIRED);
        }

        let amount = check_amount(input.get("amount"))
            .map_err(|message| errors.add("amount", message))
            .ok();

        let status = input
            .get("status")
            .and_then(|raw| raw.parse::<InvoiceStatus>().ok());
        if status.is_none() {
            errors.add("status", STATUS_REQUIRED);
        }

        errors.into_result(|| {
            Some(Self {
                customer_id: customer_id?,
                amount: amount?,
                status: status?,
            })
        })
    }
}

/// Login form: `email`, `password`.
#[derive(Debug, Clone)]
pub struct LoginForm {
    /// Validated credentials.
    pub credentials: LoginCredentials,
}

impl FormSchema for LoginForm {
    const NAME: &'static str = "login";

    fn from_input(input: &FormInput) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = check_email(input, &mut errors);
        let password = check_password(input, &mut errors);
        errors.into_result(|| {
            let credentials =
                LoginCredentials::try_from_parts(&email?, password?.as_str()).ok()?;
            Some(Self { credentials })
        })
    }
}
