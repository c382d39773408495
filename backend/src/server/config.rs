//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use dashboard::domain::ports::CollectionAccessor;
use dashboard::inbound::http::session_config::SessionSettings;
use mockable::{Clock, DefaultClock};

/// Everything [`super::create_server`] needs to start listening.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) accessor: Arc<dyn CollectionAccessor>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServerConfig {
    /// Serve `accessor` on `bind_addr` using the system clock.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        accessor: Arc<dyn CollectionAccessor>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            accessor,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
