//! JSON-RPC 2.0 over HTTP.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chat_sync_core::{
    ChatLog, ChatTransport, InitializationError, Message, SubmitAck, TransportError,
    TransportLoader,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    http,
    protocol::{RpcMethod, RpcRequest, RpcResponse, SubmitParams},
};

/// Path of the RPC endpoint under the server address.
pub const RPC_PATH: &str = "rpc";

/// Chat transport speaking JSON-RPC to `{endpoint}/rpc`.
pub struct RpcTransport {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

impl RpcTransport {
    /// Create a transport for the server at `endpoint`.
    ///
    /// # Errors
    /// Returns error if the address is not an http(s) URL or the client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self, InitializationError> {
        Ok(Self {
            client: http::build_client()?,
            url: http::endpoint_url(endpoint, RPC_PATH)?,
            next_id: AtomicU64::new(1),
        })
    }

    /// Resolved RPC URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: Value,
    ) -> Result<R, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        let response: RpcResponse = http::post_json(&self.client, &self.url, &request).await?;

        if let Some(error) = response.error {
            return Err(TransportError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        let result = response.result.ok_or_else(|| {
            TransportError::Protocol(format!("{} response has no result", method.as_str()))
        })?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl ChatTransport for RpcTransport {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn submit_message(&self, msg: &Message) -> Result<SubmitAck, TransportError> {
        let params = serde_json::to_value(SubmitParams {
            message: msg.clone(),
        })?;
        let accepted: bool = self.call(RpcMethod::SubmitMessage, params).await?;
        if accepted {
            Ok(SubmitAck)
        } else {
            Err(TransportError::Rejected)
        }
    }

    async fn list_messages(&self) -> Result<ChatLog, TransportError> {
        self.call(RpcMethod::ListMessages, Value::Null).await
    }

    async fn request_username(&self) -> Result<String, TransportError> {
        self.call(RpcMethod::GetUsername, Value::Null).await
    }
}

/// Loads an [`RpcTransport`] for a configured endpoint.
pub struct RpcLoader {
    endpoint: String,
}

impl RpcLoader {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TransportLoader for RpcLoader {
    async fn load(&self) -> Result<Arc<dyn ChatTransport>, InitializationError> {
        let transport = RpcTransport::new(&self.endpoint)?;
        tracing::debug!(url = %transport.url(), "RPC transport configured");
        Ok(Arc::new(transport))
    }
}
