//! Configuration-time transport selection.

use std::sync::Arc;

use chat_sync_core::{InitializationError, SyncConfig, TransportKind, TransportLoader};

/// Build the loader for the transport named in `config`.
///
/// The local transport gets a fresh, private store.
///
/// # Errors
/// Returns error if the selected transport was not compiled in.
pub fn loader_for(config: &SyncConfig) -> Result<Arc<dyn TransportLoader>, InitializationError> {
    match config.transport {
        #[cfg(feature = "local")]
        TransportKind::Local => Ok(Arc::new(crate::local::LocalLoader::new(Arc::new(
            chat_sync_store::ChatStorage::new(),
        )))),
        #[cfg(feature = "rpc")]
        TransportKind::Rpc => Ok(Arc::new(crate::rpc::RpcLoader::new(config.endpoint.clone()))),
        #[cfg(feature = "graphql")]
        TransportKind::Graphql => Ok(Arc::new(crate::graphql::GraphqlLoader::new(
            config.endpoint.clone(),
        ))),
        #[allow(unreachable_patterns)]
        other => Err(InitializationError::Unavailable(format!(
            "transport `{other}` is not compiled in"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chat_sync_core::ClientRegistry;

    use super::*;

    #[cfg(feature = "local")]
    #[tokio::test]
    async fn test_local_selection() {
        let config = SyncConfig {
            transport: TransportKind::Local,
            ..SyncConfig::default()
        };
        let registry = ClientRegistry::new(loader_for(&config).unwrap());
        assert_eq!(registry.get_client().await.unwrap().name(), "local");
    }

    #[cfg(feature = "rpc")]
    #[tokio::test]
    async fn test_rpc_selection_validates_endpoint() {
        let config = SyncConfig {
            endpoint: "not a url".to_string(),
            transport: TransportKind::Rpc,
            ..SyncConfig::default()
        };
        let registry = ClientRegistry::new(loader_for(&config).unwrap());
        assert!(matches!(
            registry.get_client().await,
            Err(InitializationError::InvalidEndpoint(_))
        ));
    }

    #[cfg(feature = "graphql")]
    #[tokio::test]
    async fn test_graphql_selection() {
        let config = SyncConfig {
            transport: TransportKind::Graphql,
            ..SyncConfig::default()
        };
        let registry = ClientRegistry::new(loader_for(&config).unwrap());
        assert_eq!(registry.get_client().await.unwrap().name(), "graphql");
    }
}
