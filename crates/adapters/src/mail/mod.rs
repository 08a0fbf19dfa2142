// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-mail client.
//!
//! Assignment dispatch and reservation-transfer requests travel as mail
//! messages between agents; the RPC server itself is external.

mod noop;

pub use noop::NoopMail;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMail;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from mail operations.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail service unavailable: {0}")]
    Unavailable(String),
    #[error("message not found: {0}")]
    NotFound(String),
    #[error("send rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub project: String,
    pub sender: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body_md: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub ack_required: bool,
}

/// A stored message, as listed back from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(flatten)]
    pub body: SendMessage,
    #[serde(default)]
    pub acked: bool,
}

/// Client for the agent-mail service.
#[async_trait]
pub trait MailClient: Clone + Send + Sync + 'static {
    /// Send a message, returning its server-assigned id.
    async fn send_message(&self, msg: SendMessage) -> Result<String, MailError>;

    /// Messages addressed to `agent` within `project`.
    async fn list_messages(&self, project: &str, agent: &str) -> Result<Vec<Message>, MailError>;

    async fn ack_message(&self, id: &str) -> Result<(), MailError>;
}
