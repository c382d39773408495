//! Inbound adapters that translate external requests into domain calls while
//! keeping framework details at the edge.
//!
//! HTTP handlers, sessions, and their configuration live under [`http`].

pub mod http;
