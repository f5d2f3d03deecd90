//! Compose flow: draft text, assigned author and submit state.

use thiserror::Error;

use crate::{ChatTransport, Message, SubmitAck, TransportError};

/// Compose error.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("No author assigned yet")]
    NoAuthor,
    #[error("A submit is already in flight")]
    InFlight,
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// State behind the compose form.
///
/// A submit is split into [`begin_submit`](Self::begin_submit) and
/// [`finish_submit`](Self::finish_submit) so a UI can keep drawing while the
/// request runs. The draft is only cleared once the server acknowledged it;
/// on failure it stays so the user can retry.
#[derive(Debug, Default)]
pub struct Composer {
    author: Option<String>,
    draft: String,
    in_flight: bool,
}

impl Composer {
    /// Create an empty composer with no author.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a composer for a known author.
    #[must_use]
    pub fn with_author(author: impl Into<String>) -> Self {
        let mut composer = Self::new();
        composer.set_author(author);
        composer
    }

    /// Assign the author. Blank names are ignored.
    pub fn set_author(&mut self, author: impl Into<String>) {
        let author = author.into();
        if !author.trim().is_empty() {
            self.author = Some(author);
        }
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn pop_char(&mut self) {
        self.draft.pop();
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the send control should be enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        self.author.is_some() && !self.in_flight
    }

    /// Ask the server for a username and adopt it.
    ///
    /// # Errors
    /// Returns the transport error; the current author is kept.
    pub async fn assign_username(
        &mut self,
        transport: &dyn ChatTransport,
    ) -> Result<&str, TransportError> {
        let name = transport.request_username().await?;
        self.set_author(name);
        self.author
            .as_deref()
            .ok_or_else(|| TransportError::Protocol("server assigned a blank username".to_string()))
    }

    /// Mark a submit as started and build the message to send.
    ///
    /// # Errors
    /// Returns error if no author is set or a submit is already running.
    pub fn begin_submit(&mut self) -> Result<Message, ComposeError> {
        let author = self.author.clone().ok_or(ComposeError::NoAuthor)?;
        if self.in_flight {
            return Err(ComposeError::InFlight);
        }
        self.in_flight = true;
        Ok(Message::new(author, self.draft.clone()))
    }

    /// Record how a submit settled.
    pub fn finish_submit(&mut self, result: &Result<SubmitAck, TransportError>) {
        self.in_flight = false;
        match result {
            Ok(_) => self.draft.clear(),
            Err(e) => tracing::warn!("Submit failed, keeping draft: {e}"),
        }
    }

    /// Send the current draft through `transport`.
    ///
    /// # Errors
    /// Returns error if the composer cannot submit or the transport fails.
    pub async fn submit(
        &mut self,
        transport: &dyn ChatTransport,
    ) -> Result<SubmitAck, ComposeError> {
        let message = self.begin_submit()?;
        let result = transport.submit_message(&message).await;
        self.finish_submit(&result);
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::ChatLog;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Message>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn submit_message(&self, msg: &Message) -> Result<SubmitAck, TransportError> {
            if self.fail {
                return Err(TransportError::Network("connection reset".to_string()));
            }
            self.sent.lock().unwrap().push(msg.clone());
            Ok(SubmitAck)
        }

        async fn list_messages(&self) -> Result<ChatLog, TransportError> {
            Ok(Vec::new())
        }

        async fn request_username(&self) -> Result<String, TransportError> {
            Ok("owl otter".to_string())
        }
    }

    #[tokio::test]
    async fn test_submit_clears_draft_on_success() {
        let transport = RecordingTransport::default();
        let mut composer = Composer::with_author("owen");
        composer.set_draft("hello");

        assert_ok!(composer.submit(&transport).await);

        assert_eq!(composer.draft(), "");
        assert!(composer.can_submit());
        assert_eq!(
            transport.sent.lock().unwrap().as_slice(),
            &[Message::new("owen", "hello")]
        );
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_draft() {
        let transport = RecordingTransport {
            fail: true,
            ..RecordingTransport::default()
        };
        let mut composer = Composer::with_author("owen");
        composer.set_draft("hello");

        let err = assert_err!(composer.submit(&transport).await);

        assert!(matches!(err, ComposeError::Transport(TransportError::Network(_))));
        assert_eq!(composer.draft(), "hello");
        assert!(!composer.is_in_flight());
        assert!(composer.can_submit());
    }

    #[tokio::test]
    async fn test_submit_without_author() {
        let transport = RecordingTransport::default();
        let mut composer = Composer::new();
        composer.set_draft("hello");

        assert!(matches!(
            composer.submit(&transport).await,
            Err(ComposeError::NoAuthor)
        ));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_second_begin_while_in_flight() {
        let mut composer = Composer::with_author("owen");
        composer.begin_submit().unwrap();

        assert!(!composer.can_submit());
        assert!(matches!(composer.begin_submit(), Err(ComposeError::InFlight)));

        composer.finish_submit(&Ok(SubmitAck));
        assert!(composer.can_submit());
    }

    #[test]
    fn test_empty_text_is_allowed() {
        let mut composer = Composer::with_author("owen");
        let message = composer.begin_submit().unwrap();
        assert_eq!(message, Message::new("owen", ""));
    }

    #[tokio::test]
    async fn test_assign_username() {
        let transport = RecordingTransport::default();
        let mut composer = Composer::new();

        let name = composer.assign_username(&transport).await.unwrap();
        assert_eq!(name, "owl otter");
        assert_eq!(composer.author(), Some("owl otter"));
    }

    #[test]
    fn test_blank_author_ignored() {
        let mut composer = Composer::new();
        composer.set_author("   ");
        assert_eq!(composer.author(), None);
        assert!(!composer.can_submit());
    }
}
