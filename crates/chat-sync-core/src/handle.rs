//! Lazily-loaded, memoized transport handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};

use crate::traits::{ChatTransport, InitializationError, TransportLoader};

type LoadResult = Result<Arc<dyn ChatTransport>, InitializationError>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Where the handle is in its one-way life: `Unloaded -> Loading`, then
/// `Ready` or `Failed` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportPhase {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

enum TransportState {
    Unloaded,
    Loading(PendingLoad),
    Ready(Arc<dyn ChatTransport>),
    Failed(InitializationError),
}

/// Single-flight handle to a transport.
///
/// The first `get` starts the loader; every caller, concurrent or later,
/// awaits the same pending load and receives the same instance. A failed
/// load is not retried: its error is returned to every caller from then on.
pub struct TransportHandle {
    loader: Arc<dyn TransportLoader>,
    state: Mutex<TransportState>,
}

impl TransportHandle {
    /// Create a handle that will run `loader` on first use.
    #[must_use]
    pub fn new(loader: Arc<dyn TransportLoader>) -> Self {
        Self {
            loader,
            state: Mutex::new(TransportState::Unloaded),
        }
    }

    /// Create a handle that is already ready.
    #[must_use]
    pub fn ready(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            loader: Arc::new(crate::traits::Preloaded(Arc::clone(&transport))),
            state: Mutex::new(TransportState::Ready(transport)),
        }
    }

    /// Get the transport, loading it on first call.
    ///
    /// # Errors
    /// Returns the loader's error, to this and every other caller.
    pub async fn get(&self) -> LoadResult {
        let pending = {
            let mut state = self.lock_state();
            match &*state {
                TransportState::Ready(transport) => return Ok(Arc::clone(transport)),
                TransportState::Failed(e) => return Err(e.clone()),
                TransportState::Loading(pending) => pending.clone(),
                TransportState::Unloaded => {
                    let pending = Self::begin_load(Arc::clone(&self.loader));
                    *state = TransportState::Loading(pending.clone());
                    pending
                }
            }
        };

        let result = pending.await;

        let mut state = self.lock_state();
        if matches!(*state, TransportState::Loading(_)) {
            *state = match &result {
                Ok(transport) => TransportState::Ready(Arc::clone(transport)),
                Err(e) => TransportState::Failed(e.clone()),
            };
        }
        result
    }

    /// The transport, if loading has finished successfully.
    #[must_use]
    pub fn try_get(&self) -> Option<Arc<dyn ChatTransport>> {
        match &*self.lock_state() {
            TransportState::Ready(transport) => Some(Arc::clone(transport)),
            _ => None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> TransportPhase {
        match &*self.lock_state() {
            TransportState::Unloaded => TransportPhase::Unloaded,
            TransportState::Loading(_) => TransportPhase::Loading,
            TransportState::Ready(_) => TransportPhase::Ready,
            TransportState::Failed(_) => TransportPhase::Failed,
        }
    }

    fn begin_load(loader: Arc<dyn TransportLoader>) -> PendingLoad {
        async move {
            tracing::debug!("Initializing chat transport");
            match loader.load().await {
                Ok(transport) => {
                    tracing::info!(transport = transport.name(), "Chat transport ready");
                    Ok(transport)
                }
                Err(e) => {
                    tracing::error!("Chat transport initialization failed: {e}");
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }

    fn lock_state(&self) -> MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
