// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op mail client.
//!
//! Used when no agent-mail server is configured: sends are logged and
//! acknowledged locally so dispatch can proceed without the service.

use super::{MailClient, MailError, Message, SendMessage};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMail;

impl NoopMail {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailClient for NoopMail {
    async fn send_message(&self, msg: SendMessage) -> Result<String, MailError> {
        let id = format!("local-{}", uuid::Uuid::new_v4());
        tracing::info!(
            to = %msg.to.join(","),
            subject = %msg.subject,
            id = %id,
            "mail service not configured, message logged only"
        );
        Ok(id)
    }

    async fn list_messages(&self, _project: &str, _agent: &str) -> Result<Vec<Message>, MailError> {
        Ok(Vec::new())
    }

    async fn ack_message(&self, _id: &str) -> Result<(), MailError> {
        Ok(())
    }
}
