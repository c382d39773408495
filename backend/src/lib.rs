//! Invoice dashboard backend.
//!
//! - [`domain`]: entities, validation, queries, and the ports they depend on.
//! - [`outbound`]: document store adapters implementing those ports.
//! - [`inbound`]: the HTTP adapter driving the domain.
//! - [`middleware`]: request-level access control.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use middleware::RouteGuardLayer;
