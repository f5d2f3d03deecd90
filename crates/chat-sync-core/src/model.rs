//! Chat data model shared by transports, the sync loop and the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author name the server uses for its own announcements.
pub const SYSTEM_AUTHOR: &str = "SYSTEM";

/// A message as composed by a user.
///
/// Immutable once built; transports and the UI consume it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Display name of whoever wrote the message.
    pub author: String,
    /// Message body. May be empty.
    pub text: String,
}

impl Message {
    /// Create a new message.
    #[must_use]
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }

    /// Whether this is a server announcement rather than a user message.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.author == SYSTEM_AUTHOR
    }
}

/// A message with the time the server accepted it.
///
/// Only ever produced by a transport in answer to `list_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    /// When the entry was collected by the server.
    pub timestamp: DateTime<Utc>,
    /// The message itself.
    pub msg: Message,
}

impl ChatLogEntry {
    /// Stamp a message with the current time.
    #[must_use]
    pub fn new(msg: Message) -> Self {
        Self::at(Utc::now(), msg)
    }

    /// Build an entry with an explicit timestamp.
    #[must_use]
    pub const fn at(timestamp: DateTime<Utc>, msg: Message) -> Self {
        Self { timestamp, msg }
    }
}

/// The full chat log, in server insertion order.
pub type ChatLog = Vec<ChatLogEntry>;

/// Acknowledgement returned by a successful submit.
///
/// Carries no payload; its presence is the signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_author_detection() {
        assert!(Message::new("SYSTEM", "`x` has logged on.").is_system());
        assert!(!Message::new("owen", "hello").is_system());
    }

    #[test]
    fn test_entry_wire_shape() {
        let ts = DateTime::from_timestamp(100, 0).unwrap();
        let entry = ChatLogEntry::at(ts, Message::new("x", "hi"));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["msg"]["author"], "x");
        assert_eq!(json["msg"]["text"], "hi");
        assert_eq!(json["timestamp"], "1970-01-01T00:01:40Z");
    }
}
