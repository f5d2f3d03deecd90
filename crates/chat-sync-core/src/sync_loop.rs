//! Fixed-delay polling engine with change-detected publication.
//!
//! A running loop repeatedly calls `list_messages`, compares the result with
//! the last published snapshot and publishes only when it differs. The next
//! fetch is scheduled `interval` after the previous one settles, so at most
//! one request is ever outstanding.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use futures::StreamExt;
use tokio::sync::{Mutex as AsyncMutex, broadcast, oneshot};
use tokio_stream::wrappers::BroadcastStream;

use crate::{ChatLog, ChatTransport, change};

/// Buffered publications per subscriber before it starts lagging.
const PUBLISH_CAPACITY: usize = 64;

/// Side effect fired after every publication.
///
/// The UI implements this to keep the newest entry in view. It runs
/// synchronously once the new snapshot is in place and before the next
/// poll cycle starts.
pub trait ScrollAnchor: Send + Sync {
    fn on_publish(&self);
}

/// Anchor that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnchor;

impl ScrollAnchor for NoopAnchor {
    fn on_publish(&self) {}
}

/// Lifecycle of a [`SyncLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Never started.
    Idle,
    /// Polling on schedule.
    Polling,
    /// Stopped; may be started again.
    Stopped,
}

struct SyncState {
    last_published: Option<Arc<ChatLog>>,
    status: LoopStatus,
    // Bumped on every start so a task from an earlier run cannot publish.
    generation: u64,
    stop_tx: Option<oneshot::Sender<()>>,
}

struct Inner {
    state: Mutex<SyncState>,
    // Held around every fetch; a restarted run waits out the previous run's request.
    fetch_lock: AsyncMutex<()>,
    sender: broadcast::Sender<Arc<ChatLog>>,
    anchor: Arc<dyn ScrollAnchor>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.lock_state();
        state.status == LoopStatus::Polling && state.generation == generation
    }

    /// Publish `log` if it differs from the last snapshot.
    fn publish_if_changed(&self, generation: u64, log: ChatLog) -> bool {
        {
            let mut state = self.lock_state();
            if state.status != LoopStatus::Polling || state.generation != generation {
                return false;
            }
            let previous = state.last_published.as_deref().map(Vec::as_slice);
            if !change::has_changed(previous, &log) {
                return false;
            }

            let snapshot = Arc::new(log);
            state.last_published = Some(Arc::clone(&snapshot));
            tracing::debug!(entries = snapshot.len(), "Publishing chat log");
            // No subscribers is fine; the snapshot is still retained.
            let _ = self.sender.send(snapshot);
        }

        self.anchor.on_publish();
        true
    }
}

/// Polls a transport and publishes the chat log when it changes.
pub struct SyncLoop {
    inner: Arc<Inner>,
}

impl Default for SyncLoop {
    fn default() -> Self {
        Self::new(Arc::new(NoopAnchor))
    }
}

impl SyncLoop {
    /// Create an idle loop that fires `anchor` after each publication.
    #[must_use]
    pub fn new(anchor: Arc<dyn ScrollAnchor>) -> Self {
        let (sender, _) = broadcast::channel(PUBLISH_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SyncState {
                    last_published: None,
                    status: LoopStatus::Idle,
                    generation: 0,
                    stop_tx: None,
                }),
                fetch_lock: AsyncMutex::new(()),
                sender,
                anchor,
            }),
        }
    }

    /// Start polling `transport` every `interval` (fixed delay).
    ///
    /// The first fetch is issued right away, or as soon as a fetch left
    /// over from a previous run settles. Calling this while already polling
    /// does nothing. Must be called from within a Tokio runtime.
    pub fn start(&self, transport: Arc<dyn ChatTransport>, interval: Duration) {
        let (stop_tx, stop_rx) = oneshot::channel();
        let generation = {
            let mut state = self.inner.lock_state();
            if state.status == LoopStatus::Polling {
                tracing::debug!("Sync loop already polling");
                return;
            }
            state.status = LoopStatus::Polling;
            state.generation += 1;
            state.stop_tx = Some(stop_tx);
            state.generation
        };

        tracing::debug!(
            transport = transport.name(),
            ?interval,
            "Sync loop started"
        );
        tokio::spawn(run(
            Arc::clone(&self.inner),
            transport,
            interval,
            generation,
            stop_rx,
        ));
    }

    /// Stop polling.
    ///
    /// Cancels the pending cycle. A fetch already in flight is left to
    /// finish but its result is discarded.
    pub fn stop(&self) {
        let stop_tx = {
            let mut state = self.inner.lock_state();
            if state.status != LoopStatus::Polling {
                return;
            }
            state.status = LoopStatus::Stopped;
            state.stop_tx.take()
        };

        if let Some(stop_tx) = stop_tx {
            let _ = stop_tx.send(());
        }
        tracing::debug!("Sync loop stopped");
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> LoopStatus {
        self.inner.lock_state().status
    }

    /// The most recently published log, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ChatLog>> {
        self.inner.lock_state().last_published.clone()
    }

    /// Receiver for future publications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChatLog>> {
        self.inner.sender.subscribe()
    }

    /// Stream that yields the current snapshot (if any), then every later publication.
    #[must_use]
    pub fn updates(&self) -> futures::stream::BoxStream<'static, Arc<ChatLog>> {
        let (current, rx) = {
            // Subscribe under the lock so no publication slips in between.
            let state = self.inner.lock_state();
            (state.last_published.clone(), self.inner.sender.subscribe())
        };

        let current = futures::stream::iter(current);
        let live = BroadcastStream::new(rx).filter_map(|res| async move { res.ok() });

        Box::pin(current.chain(live))
    }
}

impl Drop for SyncLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    inner: Arc<Inner>,
    transport: Arc<dyn ChatTransport>,
    interval: Duration,
    generation: u64,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        let fetched = {
            let _fetching = tokio::select! {
                biased;
                _ = &mut stop_rx => return,
                guard = inner.fetch_lock.lock() => guard,
            };
            transport.list_messages().await
        };

        if !inner.is_current(generation) {
            tracing::debug!("Discarding fetch result from stopped sync loop");
            return;
        }

        match fetched {
            Ok(log) => {
                inner.publish_if_changed(generation, log);
            }
            Err(e) => {
                tracing::warn!(transport = transport.name(), "Poll cycle failed: {e}");
            }
        }

        tokio::select! {
            biased;
            _ = &mut stop_rx => return,
            () = tokio::time::sleep(interval) => {}
        }
    }
}
