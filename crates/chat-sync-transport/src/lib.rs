//! Concrete transports for the chat core.
//!
//! Provides:
//! - Wire protocol types (JSON-RPC 2.0, GraphQL)
//! - In-process transport over a local store (feature: local)
//! - JSON-RPC over HTTP (feature: rpc)
//! - GraphQL over HTTP (feature: graphql)
//! - `loader_for` to pick one from configuration

pub mod protocol;
pub mod select;

#[cfg(any(feature = "rpc", feature = "graphql"))]
mod http;

#[cfg(feature = "local")]
pub mod local;

#[cfg(feature = "rpc")]
pub mod rpc;

#[cfg(feature = "graphql")]
pub mod graphql;

pub use protocol::{RpcErrorObject, RpcMethod, RpcRequest, RpcResponse};
pub use select::loader_for;

#[cfg(feature = "local")]
pub use local::{LocalLoader, LocalTransport};

#[cfg(feature = "rpc")]
pub use rpc::{RpcLoader, RpcTransport};

#[cfg(feature = "graphql")]
pub use graphql::{GraphqlLoader, GraphqlTransport};
