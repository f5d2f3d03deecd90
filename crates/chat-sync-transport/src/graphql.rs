//! GraphQL queries over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use chat_sync_core::{
    ChatLog, ChatTransport, InitializationError, Message, SubmitAck, TransportError,
    TransportLoader,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    http,
    protocol::{
        ALL_MESSAGES_QUERY, AllMessagesData, CREATE_MESSAGE_MUTATION, CreateMessageData,
        GET_USERNAME_MUTATION, GetUsernameData, GraphqlRequest, GraphqlResponse,
    },
};

/// Path of the GraphQL endpoint under the server address.
pub const GRAPHQL_PATH: &str = "graphql";

/// Chat transport issuing GraphQL documents to `{endpoint}/graphql`.
pub struct GraphqlTransport {
    client: Client,
    url: Url,
}

impl GraphqlTransport {
    /// Create a transport for the server at `endpoint`.
    ///
    /// # Errors
    /// Returns error if the address is not an http(s) URL or the client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self, InitializationError> {
        Ok(Self {
            client: http::build_client()?,
            url: http::endpoint_url(endpoint, GRAPHQL_PATH)?,
        })
    }

    /// Resolved GraphQL URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        operation_name: &'static str,
        variables: Value,
    ) -> Result<T, TransportError> {
        let request = GraphqlRequest {
            query,
            operation_name,
            variables,
        };
        let response: GraphqlResponse<T> =
            http::post_json(&self.client, &self.url, &request).await?;

        // GraphQL reports field errors with a 200 status.
        if let Some(error) = response.errors.into_iter().next() {
            return Err(TransportError::Remote {
                code: 0,
                message: error.message,
            });
        }
        response.data.ok_or_else(|| {
            TransportError::Protocol(format!("{operation_name} response has no data"))
        })
    }
}

#[async_trait]
impl ChatTransport for GraphqlTransport {
    fn name(&self) -> &'static str {
        "graphql"
    }

    async fn submit_message(&self, msg: &Message) -> Result<SubmitAck, TransportError> {
        let data: CreateMessageData = self
            .execute(
                CREATE_MESSAGE_MUTATION,
                "CreateMessage",
                json!({ "message": msg }),
            )
            .await?;
        if data.create_message {
            Ok(SubmitAck)
        } else {
            Err(TransportError::Rejected)
        }
    }

    async fn list_messages(&self) -> Result<ChatLog, TransportError> {
        let data: AllMessagesData = self
            .execute(ALL_MESSAGES_QUERY, "ReadMessages", Value::Null)
            .await?;
        Ok(data.all_messages.into_iter().map(Into::into).collect())
    }

    async fn request_username(&self) -> Result<String, TransportError> {
        let data: GetUsernameData = self
            .execute(GET_USERNAME_MUTATION, "GetUsername", Value::Null)
            .await?;
        Ok(data.get_username)
    }
}

/// Loads a [`GraphqlTransport`] for a configured endpoint.
pub struct GraphqlLoader {
    endpoint: String,
}

impl GraphqlLoader {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TransportLoader for GraphqlLoader {
    async fn load(&self) -> Result<Arc<dyn ChatTransport>, InitializationError> {
        let transport = GraphqlTransport::new(&self.endpoint)?;
        tracing::debug!(url = %transport.url(), "GraphQL transport configured");
        Ok(Arc::new(transport))
    }
}
