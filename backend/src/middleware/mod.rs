//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! access control.

pub mod route_guard;

pub use route_guard::RouteGuardLayer;
