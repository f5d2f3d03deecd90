//! Process-wide holder of the one shared transport.

use std::sync::{Arc, OnceLock};

use crate::{
    TransportHandle,
    traits::{ChatTransport, InitializationError, TransportLoader},
};

static GLOBAL: OnceLock<ClientRegistry> = OnceLock::new();

/// Hands out the single `ChatTransport` instance for this process.
///
/// Construct one and pass it (usually as `Arc<ClientRegistry>`) to the
/// sync loop and the compose flow. [`ClientRegistry::install_global`]
/// exists for hosts that cannot thread it through.
pub struct ClientRegistry {
    handle: TransportHandle,
}

impl ClientRegistry {
    /// Create a registry that loads its transport on first request.
    #[must_use]
    pub fn new(loader: Arc<dyn TransportLoader>) -> Self {
        Self {
            handle: TransportHandle::new(loader),
        }
    }

    /// Create a registry around a transport that already exists.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            handle: TransportHandle::ready(transport),
        }
    }

    /// Get the shared client, waiting for it to load if necessary.
    ///
    /// Every caller receives the same instance.
    ///
    /// # Errors
    /// Returns the initialization error if the transport failed to load.
    pub async fn get_client(&self) -> Result<Arc<dyn ChatTransport>, InitializationError> {
        self.handle.get().await
    }

    /// The client, if it has already finished loading.
    #[must_use]
    pub fn try_client(&self) -> Option<Arc<dyn ChatTransport>> {
        self.handle.try_get()
    }

    /// Underlying handle.
    #[must_use]
    pub const fn handle(&self) -> &TransportHandle {
        &self.handle
    }

    /// Install the process-wide registry.
    ///
    /// # Errors
    /// Gives the registry back if one was already installed.
    pub fn install_global(registry: Self) -> Result<(), Self> {
        GLOBAL.set(registry)
    }

    /// The process-wide registry, if one was installed.
    #[must_use]
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}
