//! Turn action outcomes into HTTP responses.
//!
//! Redirects become `303 See Other` so the browser follows them with a `GET`.
//! Invalid submissions become `422 Unprocessable Entity` carrying the
//! [`FormState`](crate::domain::FormState) JSON.

use actix_web::HttpResponse;
use actix_web::http::header::LOCATION;
use tracing::debug;

use crate::domain::ActionOutcome;
use crate::inbound::http::cache_control::{REVALIDATE_HEADER, private_no_cache_header};

/// `303 See Other` to `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .insert_header(private_no_cache_header())
        .finish()
}

/// Execute the decision carried by `outcome`.
pub fn outcome_response(outcome: ActionOutcome) -> HttpResponse {
    match outcome {
        ActionOutcome::Redirect {
            location,
            invalidate,
        } => {
            let mut response = HttpResponse::SeeOther();
            response
                .insert_header((LOCATION, location.as_str()))
                .insert_header(private_no_cache_header());
            if !invalidate.is_empty() {
                debug!(?invalidate, location = %location, "views invalidated by mutation");
                response.insert_header((REVALIDATE_HEADER, invalidate.join(", ")));
            }
            response.finish()
        }
        ActionOutcome::Invalid(state) => HttpResponse::UnprocessableEntity()
            .insert_header(private_no_cache_header())
            .json(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{FieldErrors, FormState};

    #[rstest]
    fn redirect_sets_location_and_stale_views() {
        let response = outcome_response(ActionOutcome::Redirect {
            location: "/dashboard/invoices".to_owned(),
            invalidate: vec!["/dashboard/invoices".to_owned(), "/dashboard".to_owned()],
        });
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/dashboard/invoices")
        );
        assert_eq!(
            response
                .headers()
                .get(REVALIDATE_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("/dashboard/invoices, /dashboard")
        );
    }

    #[rstest]
    fn redirect_without_stale_views_omits_the_header() {
        let response = outcome_response(ActionOutcome::Redirect {
            location: "/login".to_owned(),
            invalidate: Vec::new(),
        });
        assert!(response.headers().get(REVALIDATE_HEADER).is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn invalid_state_is_unprocessable_json() {
        let response = outcome_response(ActionOutcome::Invalid(FormState::invalid(
            "Failed to register user.",
            FieldErrors::single("email", "User already exists."),
        )));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            value,
            json!({
                "message": "Failed to register user.",
                "errors": {"email": ["User already exists."]},
            })
        );
    }
}
