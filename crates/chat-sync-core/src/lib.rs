//! Transport abstraction and message synchronization for chat clients.
//!
//! This crate provides:
//! - `ChatTransport` - Uniform interface to the chat server
//! - `TransportHandle` / `ClientRegistry` - Single-flight, memoized transport loading
//! - `SyncLoop` - Fixed-delay polling with change-detected publication
//! - `Composer` / `ChatSession` - The compose flow and UI-facing facade

pub mod change;
pub mod compose;
pub mod config;
pub mod handle;
pub mod model;
pub mod registry;
pub mod session;
pub mod sync_loop;
pub mod traits;

pub use change::has_changed;
pub use compose::{ComposeError, Composer};
pub use config::{ConfigError, SyncConfig, TransportKind};
pub use handle::{TransportHandle, TransportPhase};
pub use model::{ChatLog, ChatLogEntry, Message, SYSTEM_AUTHOR, SubmitAck};
pub use registry::ClientRegistry;
pub use session::{ChatSession, SessionError};
pub use sync_loop::{LoopStatus, NoopAnchor, ScrollAnchor, SyncLoop};
pub use traits::{ChatTransport, InitializationError, Preloaded, TransportError, TransportLoader};
