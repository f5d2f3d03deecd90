//! UI-facing chat session: mount/unmount, subscribe, submit.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::sync::broadcast;

use crate::{
    ChatLog, ClientRegistry, InitializationError, LoopStatus, Message, ScrollAnchor, SubmitAck,
    SyncLoop, TransportError,
};

/// Session error.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Initialization error: {0}")]
    Init(#[from] InitializationError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Everything a chat UI needs from the core.
///
/// Wraps a shared [`ClientRegistry`] and one [`SyncLoop`]. Mounting starts
/// polling, unmounting stops it; dropping the session stops it too.
pub struct ChatSession {
    registry: Arc<ClientRegistry>,
    poll_interval: Duration,
    sync: SyncLoop,
}

impl ChatSession {
    /// Create an unmounted session.
    #[must_use]
    pub fn new(
        registry: Arc<ClientRegistry>,
        poll_interval: Duration,
        anchor: Arc<dyn ScrollAnchor>,
    ) -> Self {
        Self {
            registry,
            poll_interval,
            sync: SyncLoop::new(anchor),
        }
    }

    /// Resolve the transport and start polling.
    ///
    /// # Errors
    /// Returns error if the transport could not be initialized.
    pub async fn mount(&self) -> Result<(), SessionError> {
        let transport = self.registry.get_client().await?;
        self.sync.start(transport, self.poll_interval);
        Ok(())
    }

    /// Stop polling.
    pub fn unmount(&self) {
        self.sync.stop();
    }

    /// Receiver for log publications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChatLog>> {
        self.sync.subscribe()
    }

    /// Current snapshot followed by every later publication.
    #[must_use]
    pub fn updates(&self) -> futures::stream::BoxStream<'static, Arc<ChatLog>> {
        self.sync.updates()
    }

    /// Latest published log.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ChatLog>> {
        self.sync.snapshot()
    }

    #[must_use]
    pub fn status(&self) -> LoopStatus {
        self.sync.status()
    }

    /// Submit a message, independent of the poll cycle.
    ///
    /// # Errors
    /// Returns error if the transport is unavailable or the call fails.
    pub async fn submit(&self, message: Message) -> Result<SubmitAck, SessionError> {
        let transport = self.registry.get_client().await?;
        transport.submit_message(&message).await.map_err(|e| {
            tracing::warn!(transport = transport.name(), "Submit failed: {e}");
            SessionError::Transport(e)
        })
    }

    /// Ask the server for a username.
    ///
    /// # Errors
    /// Returns error if the transport is unavailable or the call fails.
    pub async fn request_username(&self) -> Result<String, SessionError> {
        let transport = self.registry.get_client().await?;
        Ok(transport.request_username().await?)
    }

    /// Shared registry backing this session.
    #[must_use]
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }
}
