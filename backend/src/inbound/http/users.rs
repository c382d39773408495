//! Sign-in, registration, and sign-out handlers.
//!
//! ```text
//! POST /login     email=user@nextmail.com&password=123456
//! POST /register  name=…&email=…&password=…
//! POST /logout
//! ```

use actix_web::{HttpResponse, post, web};
use tracing::info;

use crate::domain::{
    DASHBOARD_PATH, Error, ErrorCode, FormInput, LOGIN_PATH, LoginForm, validate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::outcome::{outcome_response, see_other};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Message for every rejected sign-in, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

fn invalid_credentials() -> Error {
    Error::unauthorized(INVALID_CREDENTIALS)
}

/// Authenticate the submitted credentials and start a session.
///
/// Malformed input, unknown emails, and wrong passwords all yield the same
/// `401` so the response does not reveal which accounts exist.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<FormInput>,
) -> ApiResult<HttpResponse> {
    let LoginForm { credentials } =
        validate::<LoginForm>(&form).map_err(|_| invalid_credentials())?;
    let user_id = state
        .login
        .authenticate(&credentials)
        .await
        .map_err(|err| match err.code() {
            ErrorCode::Unauthorized => invalid_credentials(),
            _ => err,
        })?;
    session.persist_user(&user_id)?;
    info!(user_id = %user_id, "user signed in");
    Ok(see_other(DASHBOARD_PATH))
}

/// Create an account from the registration form.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    form: web::Form<FormInput>,
) -> ApiResult<HttpResponse> {
    let outcome = state.registration.register(&form).await?;
    Ok(outcome_response(outcome))
}

/// End the session and send the browser back to the login page.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    see_other(LOGIN_PATH)
}
