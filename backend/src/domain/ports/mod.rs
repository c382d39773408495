//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod collection_accessor;
mod login_service;

#[cfg(test)]
pub use collection_accessor::MockCollectionAccessor;
pub use collection_accessor::{
    Collection, CollectionAccessor, Condition, DatabaseError, Document, Filter, ID_FIELD,
    UpdateSummary,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{
    FIXTURE_EMAIL, FIXTURE_PASSWORD, FIXTURE_USER_ID, FixtureLoginService, LoginService,
};
