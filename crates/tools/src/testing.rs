//! Collaborator doubles shared by the tool tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use {
    async_trait::async_trait,
    yatools_common::Recipient,
    yatools_messages::{Envelope, InMemoryMessageStore, MessageStore},
};

use crate::{
    context::ToolContext,
    error::{Error, Result},
    sender::{MessageSender, OutboundRequest},
};

pub const PHONE: &str = "5215512345678";
pub const COMPANY: &str = "acme";

/// Returns `ext-1`, `ext-2`, ... and remembers every request.
#[derive(Default)]
pub struct RecordingSender {
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingSender {
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, request: &OutboundRequest) -> Result<String> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(format!("ext-{}", requests.len()))
    }
}

pub struct FailingSender;

#[async_trait]
impl MessageSender for FailingSender {
    async fn send(&self, _request: &OutboundRequest) -> Result<String> {
        Err(Error::send("gateway unavailable"))
    }
}

/// Like [`RecordingSender`], but the `fail_on`-th call (1-based) fails.
/// Ids keep counting calls, so a failure leaves a gap.
pub struct FlakySender {
    fail_on: usize,
    calls: Mutex<usize>,
}

impl FlakySender {
    pub fn failing_on(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl MessageSender for FlakySender {
    async fn send(&self, _request: &OutboundRequest) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == self.fail_on {
            return Err(Error::send("gateway unavailable"));
        }
        Ok(format!("ext-{calls}"))
    }
}

pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    async fn insert_message(&self, _envelope: &Envelope) -> yatools_messages::Result<String> {
        Err(yatools_messages::Error::message("database is down"))
    }
}

pub struct Harness {
    pub ctx: ToolContext,
    pub store: Arc<InMemoryMessageStore>,
    pub sender: Arc<RecordingSender>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryMessageStore::new());
        let sender = Arc::new(RecordingSender::default());
        let ctx = ToolContext::new(
            Recipient::new(PHONE, COMPANY),
            store.clone(),
            sender.clone(),
        );
        Self { ctx, store, sender }
    }

    pub async fn envelopes(&self) -> Vec<Envelope> {
        self.store
            .messages()
            .await
            .into_iter()
            .map(|stored| stored.envelope)
            .collect()
    }
}

pub fn context_with(
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn MessageSender>,
) -> ToolContext {
    ToolContext::new(Recipient::new(PHONE, COMPANY), store, sender)
}
