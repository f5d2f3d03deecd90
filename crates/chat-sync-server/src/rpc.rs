//! JSON-RPC dispatcher.

use axum::{Json, body::Bytes, extract::State};
use chat_sync_transport::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND,
    PARSE_ERROR, RpcMethod, RpcRequest, RpcResponse, SubmitParams,
};
use serde_json::Value;

use crate::AppState;

/// `POST /rpc`.
///
/// Always answers 200 with a JSON-RPC envelope; failures travel in `error`.
pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Json<RpcResponse> {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Unparseable RPC body: {e}");
            return Json(RpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            ));
        }
    };

    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::failure(
                Value::Null,
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            ));
        }
    };

    Json(dispatch(&state, request))
}

/// Execute one request against the shared state.
#[must_use]
pub fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    let RpcRequest {
        jsonrpc,
        id,
        method,
        params,
    } = request;

    if jsonrpc != JSONRPC_VERSION {
        return RpcResponse::failure(
            id,
            INVALID_REQUEST,
            format!("Unsupported jsonrpc version {jsonrpc:?}"),
        );
    }
    let Some(method) = RpcMethod::from_name(&method) else {
        tracing::debug!(%method, "Unknown RPC method");
        return RpcResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        );
    };

    match method {
        RpcMethod::ListMessages => match serde_json::to_value(state.storage.all_messages()) {
            Ok(log) => RpcResponse::success(id, log),
            Err(e) => RpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
        },
        RpcMethod::SubmitMessage => {
            let SubmitParams { message } = match serde_json::from_value(params) {
                Ok(params) => params,
                Err(e) => {
                    return RpcResponse::failure(
                        id,
                        INVALID_PARAMS,
                        format!("Invalid params: {e}"),
                    );
                }
            };
            if message.author.trim().is_empty() {
                return RpcResponse::failure(id, INVALID_PARAMS, "Author must not be empty");
            }
            state.storage.publish_message(message);
            RpcResponse::success(id, Value::Bool(true))
        }
        RpcMethod::GetUsername => match state.names.get_name() {
            Ok(name) => {
                state.storage.announce_login(&name);
                tracing::info!(%name, "Assigned username");
                RpcResponse::success(id, Value::String(name))
            }
            Err(e) => {
                tracing::error!("Failed to generate username: {e}");
                RpcResponse::failure(id, INTERNAL_ERROR, e.to_string())
            }
        },
    }
}
