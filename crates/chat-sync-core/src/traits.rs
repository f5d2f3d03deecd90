//! Core traits for reaching the chat server.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{ChatLog, Message, SubmitAck};

/// A single `submit_message` / `list_messages` call failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected HTTP status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Remote error {code}: {message}")]
    Remote { code: i64, message: String },
    #[error("Message rejected by server")]
    Rejected,
    #[error("Operation not supported by this transport: {0}")]
    Unsupported(&'static str),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

/// The transport failed to become ready.
///
/// Cloneable so that one failed load can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializationError {
    #[error("Invalid endpoint address: {0}")]
    InvalidEndpoint(String),
    #[error("Failed to connect transport: {0}")]
    Connect(String),
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Uniform interface to the chat server.
///
/// Every concrete transport (in-process, JSON-RPC, GraphQL) implements
/// this with the same contract, so nothing above it knows which one is in use.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Post a new message.
    ///
    /// The entry becomes visible to later `list_messages` calls, though
    /// not necessarily the very next one.
    async fn submit_message(&self, msg: &Message) -> Result<SubmitAck, TransportError>;

    /// Fetch the complete current log. Never a delta.
    async fn list_messages(&self) -> Result<ChatLog, TransportError>;

    /// Ask the server to assign a display name to this client.
    async fn request_username(&self) -> Result<String, TransportError> {
        Err(TransportError::Unsupported("request_username"))
    }
}

/// Asynchronously constructs a transport.
///
/// Called at most once per [`TransportHandle`](crate::TransportHandle).
#[async_trait]
pub trait TransportLoader: Send + Sync {
    /// Build the transport (load a module, open a connection, ...).
    async fn load(&self) -> Result<Arc<dyn ChatTransport>, InitializationError>;
}

/// Loader that hands out a transport which already exists.
pub struct Preloaded(pub Arc<dyn ChatTransport>);

#[async_trait]
impl TransportLoader for Preloaded {
    async fn load(&self) -> Result<Arc<dyn ChatTransport>, InitializationError> {
        Ok(Arc::clone(&self.0))
    }
}
