//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chat_sync_core::{
    ChatLog, ChatLogEntry, ChatTransport, Message, ScrollAnchor, SubmitAck, TransportError,
};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{Notify, Semaphore},
    time::Instant,
};

pub fn entry(secs: i64, author: &str, text: &str) -> ChatLogEntry {
    ChatLogEntry::at(
        DateTime::from_timestamp(secs, 0).unwrap(),
        Message::new(author, text),
    )
}

/// Counts `on_publish` calls.
#[derive(Default)]
pub struct CountingAnchor(AtomicUsize);

impl CountingAnchor {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ScrollAnchor for CountingAnchor {
    fn on_publish(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport that replays a script of `list_messages` results.
///
/// Once the script runs out the last successful log is repeated.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ChatLog, TransportError>>>,
    last: Mutex<ChatLog>,
    latency: Duration,
    gate: Option<Arc<Semaphore>>,
    pub entered: Arc<Notify>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started_at: Mutex<Vec<Instant>>,
    store: Mutex<ChatLog>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<ChatLog, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Each fetch takes `latency` of (virtual) time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Each fetch waits for a permit on `gate` before returning.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Vec<Instant> {
        self.started_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn submit_message(&self, msg: &Message) -> Result<SubmitAck, TransportError> {
        let mut store = self.store.lock().unwrap();
        store.push(ChatLogEntry::at(Utc::now(), msg.clone()));
        *self.last.lock().unwrap() = store.clone();
        Ok(SubmitAck)
    }

    async fn list_messages(&self) -> Result<ChatLog, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started_at.lock().unwrap().push(Instant::now());
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        self.entered.notify_one();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(log)) => {
                *self.last.lock().unwrap() = log.clone();
                Ok(log)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }

    async fn request_username(&self) -> Result<String, TransportError> {
        Ok("owl owen".to_string())
    }
}
