//! Session-aware access control applied to every request.
//!
//! Anonymous requests for the dashboard are sent to the login page and
//! signed-in requests for the login or registration pages are sent to the
//! dashboard. Everything else reaches the handlers untouched.
//!
//! The guard reads the session, so it must be registered *before* the session
//! middleware (Actix runs the last `wrap` first).

use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::RouteGuard;
use crate::inbound::http::outcome::see_other;
use crate::inbound::http::session::SessionContext;

/// Middleware factory applying [`RouteGuard`] decisions.
///
/// # Examples
/// ```
/// use actix_session::{SessionMiddleware, storage::CookieSessionStore};
/// use actix_web::{App, cookie::Key};
/// use dashboard::middleware::RouteGuardLayer;
///
/// let _app = App::new()
///     .wrap(RouteGuardLayer::default())
///     .wrap(SessionMiddleware::new(CookieSessionStore::default(), Key::generate()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuardLayer {
    guard: RouteGuard,
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuardLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service,
            guard: self.guard,
        }))
    }
}

/// Service wrapper produced by [`RouteGuardLayer`].
pub struct RouteGuardMiddleware<S> {
    service: S,
    guard: RouteGuard,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let signed_in = SessionContext::new(req.get_session()).is_signed_in();
        let decision = self.guard.evaluate(req.path(), signed_in);
        if let Some(location) = decision.location() {
            debug!(path = %req.path(), ?decision, "route guard redirect");
            let response = see_other(location);
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
