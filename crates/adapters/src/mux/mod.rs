// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer client.

mod tmux;

pub use tmux::TmuxMux;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMux, FakePane};

use async_trait::async_trait;
use muster_core::PaneId;
use std::path::Path;
use thiserror::Error;

/// Errors from multiplexer operations.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("pane not found: {0}")]
    PaneNotFound(String),
    #[error("multiplexer command failed: {0}")]
    CommandFailed(String),
    #[error("multiplexer unavailable: {0}")]
    Unavailable(String),
}

/// One pane in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub id: PaneId,
    pub index: u32,
    pub title: String,
    /// Model/variant tag recorded at spawn time; empty when unset
    pub variant: String,
}

/// Client for the terminal multiplexer hosting the fleet.
#[async_trait]
pub trait MuxClient: Clone + Send + Sync + 'static {
    /// List session names.
    async fn list_sessions(&self) -> Result<Vec<String>, MuxError>;

    /// List panes of a session, in index order.
    async fn list_panes(&self, session: &str) -> Result<Vec<Pane>, MuxError>;

    /// Capture the last `lines` lines of a pane's scrollback.
    async fn capture_pane(&self, id: &PaneId, lines: u32) -> Result<String, MuxError>;

    /// Send text to a pane, optionally followed by Enter.
    async fn send_keys(&self, id: &PaneId, text: &str, enter: bool) -> Result<(), MuxError>;

    /// Retitle a pane.
    async fn set_pane_title(&self, id: &PaneId, title: &str) -> Result<(), MuxError>;

    /// Split a new pane into a session, returning its ID.
    async fn split_window(&self, session: &str, cwd: &Path) -> Result<PaneId, MuxError>;

    /// Tear down a session.
    async fn kill_session(&self, session: &str) -> Result<(), MuxError>;

    /// Last activity in a pane's window, epoch milliseconds.
    async fn pane_last_activity(&self, id: &PaneId) -> Result<u64, MuxError>;
}
