//! In-process transport over a [`ChatStorage`] living in the same process.

use std::sync::Arc;

use async_trait::async_trait;
use chat_sync_core::{
    ChatLog, ChatTransport, InitializationError, Message, SubmitAck, TransportError,
    TransportLoader,
};
use chat_sync_store::{ChatStorage, NameGenerator};

/// Transport that calls straight into a local store.
pub struct LocalTransport {
    storage: Arc<ChatStorage>,
    names: NameGenerator,
}

impl LocalTransport {
    #[must_use]
    pub const fn new(storage: Arc<ChatStorage>, names: NameGenerator) -> Self {
        Self { storage, names }
    }

    /// The backing store.
    #[must_use]
    pub const fn storage(&self) -> &Arc<ChatStorage> {
        &self.storage
    }
}

#[async_trait]
impl ChatTransport for LocalTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn submit_message(&self, msg: &Message) -> Result<SubmitAck, TransportError> {
        self.storage.publish_message(msg.clone());
        Ok(SubmitAck)
    }

    async fn list_messages(&self) -> Result<ChatLog, TransportError> {
        Ok(self.storage.all_messages())
    }

    async fn request_username(&self) -> Result<String, TransportError> {
        let name = self
            .names
            .get_name()
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        self.storage.announce_login(&name);
        Ok(name)
    }
}

/// Loads a [`LocalTransport`] over a shared store.
pub struct LocalLoader {
    storage: Arc<ChatStorage>,
    names: NameGenerator,
}

impl LocalLoader {
    #[must_use]
    pub fn new(storage: Arc<ChatStorage>) -> Self {
        Self {
            storage,
            names: NameGenerator::default(),
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: NameGenerator) -> Self {
        self.names = names;
        self
    }
}

#[async_trait]
impl TransportLoader for LocalLoader {
    async fn load(&self) -> Result<Arc<dyn ChatTransport>, InitializationError> {
        Ok(Arc::new(LocalTransport::new(
            Arc::clone(&self.storage),
            self.names.clone(),
        )))
    }
}
