//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{CollectionAccessor, LoginService};
use crate::domain::{CredentialLoginService, DashboardQueries, InvoiceActions, RegistrationAction};

/// Queries over whichever accessor the server was built with.
pub type SharedQueries = DashboardQueries<dyn CollectionAccessor>;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential check used by `POST /login`.
    pub login: Arc<dyn LoginService>,
    /// Read queries behind the dashboard views.
    pub queries: SharedQueries,
    /// Invoice form actions.
    pub invoices: InvoiceActions<dyn CollectionAccessor>,
    /// Sign-up form action.
    pub registration: RegistrationAction<dyn CollectionAccessor>,
}

impl HttpState {
    /// Build state from the query layer and a login service.
    pub fn new(queries: SharedQueries, login: Arc<dyn LoginService>) -> Self {
        Self {
            login,
            invoices: InvoiceActions::new(queries.clone()),
            registration: RegistrationAction::new(queries.clone()),
            queries,
        }
    }

    /// Build state over `accessor`, authenticating against its `users`
    /// collection.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use dashboard::inbound::http::state::HttpState;
    /// use dashboard::outbound::persistence::InMemoryCollectionAccessor;
    /// use mockable::DefaultClock;
    ///
    /// let state = HttpState::from_accessor(
    ///     Arc::new(InMemoryCollectionAccessor::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _queries = state.queries.clone();
    /// ```
    pub fn from_accessor(accessor: Arc<dyn CollectionAccessor>, clock: Arc<dyn Clock>) -> Self {
        let queries: SharedQueries = DashboardQueries::new(accessor, clock);
        let login = Arc::new(CredentialLoginService::new(queries.clone()));
        Self::new(queries, login)
    }
}
