//! HTTP chat server.
//!
//! Hosts one in-memory [`ChatStorage`] and exposes it through the JSON-RPC
//! endpoint the `rpc` transport talks to.

pub mod rpc;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use chat_sync_core::ConfigError;
use chat_sync_store::{ChatStorage, NameGenerator};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Address the server binds to when `CHAT_BIND` is unset.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<ChatStorage>,
    pub names: NameGenerator,
}

impl AppState {
    #[must_use]
    pub const fn new(storage: Arc<ChatStorage>, names: NameGenerator) -> Self {
        Self { storage, names }
    }
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Directory holding `adjectives.txt` / `animals.txt`.
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `CHAT_BIND` and `DATA_DIR`.
    ///
    /// # Errors
    /// Returns error if `CHAT_BIND` is not a socket address.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns error if `CHAT_BIND` is not a socket address.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup("CHAT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: "CHAT_BIND",
            value: raw.clone(),
        })?;
        Ok(Self {
            bind,
            data_dir: lookup("DATA_DIR").map(PathBuf::from),
        })
    }
}

/// Build the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rpc", post(rpc::rpc_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_config_rejects_bad_bind() {
        let err = ServerConfig::from_lookup(|key| {
            (key == "CHAT_BIND").then(|| "localhost".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "CHAT_BIND", .. }));
    }
}
