// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake mail client for testing

use super::{MailClient, MailError, Message, SendMessage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct FakeMailState {
    messages: Vec<Message>,
    next_id: u64,
    reject_sends: bool,
}

/// In-memory mail service for tests.
#[derive(Clone, Default)]
pub struct FakeMail {
    inner: Arc<Mutex<FakeMailState>>,
}

impl FakeMail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far.
    pub fn sent(&self) -> Vec<Message> {
        self.inner.lock().messages.clone()
    }

    /// Make subsequent sends fail, for dispatch-error tests.
    pub fn reject_sends(&self, reject: bool) {
        self.inner.lock().reject_sends = reject;
    }
}

#[async_trait]
impl MailClient for FakeMail {
    async fn send_message(&self, msg: SendMessage) -> Result<String, MailError> {
        let mut state = self.inner.lock();
        if state.reject_sends {
            return Err(MailError::Rejected("fake rejection".to_string()));
        }
        state.next_id += 1;
        let id = format!("msg-{}", state.next_id);
        state.messages.push(Message {
            id: id.clone(),
            body: msg,
            acked: false,
        });
        Ok(id)
    }

    async fn list_messages(&self, project: &str, agent: &str) -> Result<Vec<Message>, MailError> {
        let state = self.inner.lock();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.body.project == project && m.body.to.iter().any(|t| t == agent))
            .cloned()
            .collect())
    }

    async fn ack_message(&self, id: &str) -> Result<(), MailError> {
        let mut state = self.inner.lock();
        let msg = state
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| MailError::NotFound(id.to_string()))?;
        msg.acked = true;
        Ok(())
    }
}
