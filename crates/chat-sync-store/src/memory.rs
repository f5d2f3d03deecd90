//! In-memory chat storage.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chat_sync_core::{ChatLog, ChatLogEntry, Message, SYSTEM_AUTHOR};

/// In-memory, append-only chat log.
///
/// Useful for development and single-process deployments.
/// Data is lost on restart.
pub struct ChatStorage {
    entries: RwLock<ChatLog>,
}

impl ChatStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Stamp `msg` with the current time and append it.
    pub fn publish_message(&self, msg: Message) -> ChatLogEntry {
        let entry = ChatLogEntry::new(msg);
        self.write().push(entry.clone());
        tracing::debug!(author = %entry.msg.author, "Stored message");
        entry
    }

    /// Post a system announcement that `name` has joined.
    pub fn announce_login(&self, name: &str) -> ChatLogEntry {
        self.publish_message(Message::new(
            SYSTEM_AUTHOR,
            format!("`{name}` has logged on."),
        ))
    }

    /// A copy of the full log, oldest first.
    #[must_use]
    pub fn all_messages(&self) -> ChatLog {
        self.read().clone()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Writers only ever push whole entries; a poisoned guard is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, ChatLog> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChatLog> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChatStorage {
    fn default() -> Self {
        Self::new()
    }
}
