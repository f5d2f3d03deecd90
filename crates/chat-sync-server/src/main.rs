//! Chat server binary.
//!
//! Run with: cargo run -p chat-sync-server
//!
//! Then point a client at http://127.0.0.1:8080 with `CHAT_TRANSPORT=rpc`.

use std::sync::Arc;

use chat_sync_server::{AppState, ServerConfig, create_router};
use chat_sync_store::{ChatStorage, NameGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let names = match &config.data_dir {
        Some(dir) => NameGenerator::from_dir(dir)?,
        None => NameGenerator::default(),
    };
    let state = AppState::new(Arc::new(ChatStorage::new()), names);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Chat server listening on http://{}", config.bind);

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
