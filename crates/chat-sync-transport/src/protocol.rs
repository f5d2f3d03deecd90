//! Wire protocol for client-server communication.
//!
//! Two encodings of the same two operations: JSON-RPC 2.0 (shared with the
//! server crate) and GraphQL documents (client side only).

use chat_sync_core::{ChatLogEntry, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request body could not be parsed as JSON.
pub const PARSE_ERROR: i64 = -32700;
/// Body is JSON but not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// Method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Params are missing or malformed.
pub const INVALID_PARAMS: i64 = -32602;
/// Server-side failure.
pub const INTERNAL_ERROR: i64 = -32603;

/// Remote procedures exposed by the chat server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    /// Full chat log. No params.
    ListMessages,
    /// Append a message. Params: [`SubmitParams`].
    SubmitMessage,
    /// Assign a username. No params.
    GetUsername,
}

impl RpcMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListMessages => "list_messages",
            Self::SubmitMessage => "submit_message",
            Self::GetUsername => "get_username",
        }
    }

    /// Look up a method by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list_messages" => Some(Self::ListMessages),
            "submit_message" => Some(Self::SubmitMessage),
            "get_username" => Some(Self::GetUsername),
            _ => None,
        }
    }
}

/// Params for `submit_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitParams {
    pub message: Message,
}

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl RpcRequest {
    /// Build a request for `method`.
    #[must_use]
    pub fn new(id: u64, method: RpcMethod, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.as_str().to_string(),
            params,
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC response. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Successful response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    #[must_use]
    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcErrorObject {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Query for the full log.
pub const ALL_MESSAGES_QUERY: &str = "query ReadMessages { allMessages { timestamp author text } }";

/// Mutation posting one message.
pub const CREATE_MESSAGE_MUTATION: &str =
    "mutation CreateMessage($message: MessageInput!) { createMessage(message: $message) }";

/// Mutation assigning a username.
pub const GET_USERNAME_MUTATION: &str = "mutation GetUsername { getUsername }";

/// GraphQL request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub operation_name: &'static str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

/// GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// `allMessages` item; the schema flattens the message fields.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlEntry {
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub text: String,
}

impl From<GraphqlEntry> for ChatLogEntry {
    fn from(entry: GraphqlEntry) -> Self {
        Self::at(entry.timestamp, Message::new(entry.author, entry.text))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllMessagesData {
    pub all_messages: Vec<GraphqlEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageData {
    pub create_message: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUsernameData {
    pub get_username: String,
}
