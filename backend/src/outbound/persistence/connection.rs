//! Lazily established, shared document store connection.
//!
//! The [`ConnectionManager`] owns at most one live handle. The first caller of
//! [`ConnectionManager::connect`] establishes it; concurrent first callers wait
//! on the same initialisation instead of opening their own. The handle itself
//! (a driver client) pools connections internally.
//!
//! The manager is generic over a [`Connector`] so the single-flight behaviour
//! can be exercised without a live server.

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::ConnectionSettings;

/// Raised when a connection cannot be established.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The client could not be built or the server did not answer the
    /// handshake.
    #[error("document store handshake failed: {message}")]
    Handshake {
        /// Driver-level description.
        message: String,
    },
}

impl ConnectionError {
    /// Create a handshake error with the given message.
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake {
            message: message.into(),
        }
    }
}

/// Opens and closes store handles.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Shared handle returned to callers. Cloning must be cheap.
    type Handle: Clone + Send + Sync + 'static;

    /// Build a handle and confirm the server answers.
    async fn establish(&self, settings: &ConnectionSettings)
    -> Result<Self::Handle, ConnectionError>;

    /// Release resources held by `handle`.
    async fn release(&self, handle: Self::Handle);
}

/// Single-flight owner of the store handle.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    settings: ConnectionSettings,
    handle: RwLock<Option<C::Handle>>,
    init: Mutex<()>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager that will connect with `settings` on first use.
    pub fn new(connector: C, settings: ConnectionSettings) -> Self {
        Self {
            connector,
            settings,
            handle: RwLock::new(None),
            init: Mutex::new(()),
        }
    }

    /// Settings used to establish the handle.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Return the live handle, establishing it first if necessary.
    ///
    /// Idempotent: once established, every call returns a clone of the same
    /// handle until [`ConnectionManager::close`] runs.
    pub async fn connect(&self) -> Result<C::Handle, ConnectionError> {
        if let Some(handle) = self.handle.read().await.as_ref() {
            return Ok(handle.clone());
        }

        let _init = self.init.lock().await;
        if let Some(handle) = self.handle.read().await.as_ref() {
            return Ok(handle.clone());
        }

        debug!(database = %self.settings.database, "establishing document store connection");
        let handle = self
            .connector
            .establish(&self.settings)
            .await
            .inspect_err(|err| warn!(error = %err, "document store connection failed"))?;
        *self.handle.write().await = Some(handle.clone());
        info!(
            database = %self.settings.database,
            max_pool_size = self.settings.max_pool_size,
            "document store connected"
        );
        Ok(handle)
    }

    /// Release the handle. A later [`ConnectionManager::connect`] opens a new
    /// one.
    pub async fn close(&self) {
        let _init = self.init.lock().await;
        let taken = self.handle.write().await.take();
        if let Some(handle) = taken {
            self.connector.release(handle).await;
            info!("document store connection closed");
        }
    }

    /// Whether a handle is currently held.
    pub async fn is_connected(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
