// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake multiplexer for testing

use super::{MuxClient, MuxError, Pane};
use async_trait::async_trait;
use muster_core::PaneId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// One fake pane's state.
#[derive(Debug, Clone, Default)]
pub struct FakePane {
    pub index: u32,
    pub title: String,
    pub variant: String,
    pub scrollback: String,
    pub last_activity_ms: u64,
    pub sent: Vec<(String, bool)>,
}

#[derive(Default)]
struct FakeMuxState {
    // session -> pane id -> pane
    sessions: HashMap<String, HashMap<PaneId, FakePane>>,
    next_pane: u64,
}

/// In-memory multiplexer for tests.
#[derive(Clone, Default)]
pub struct FakeMux {
    inner: Arc<Mutex<FakeMuxState>>,
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pane, creating the session on first use.
    pub fn add_pane(&self, session: &str, index: u32, title: &str) -> PaneId {
        let mut state = self.inner.lock();
        state.next_pane += 1;
        let id = PaneId::new(format!("%{}", state.next_pane));
        state.sessions.entry(session.to_string()).or_default().insert(
            id.clone(),
            FakePane {
                index,
                title: title.to_string(),
                ..Default::default()
            },
        );
        id
    }

    pub fn set_variant(&self, id: &PaneId, variant: &str) {
        let mut state = self.inner.lock();
        for panes in state.sessions.values_mut() {
            if let Some(pane) = panes.get_mut(id) {
                pane.variant = variant.to_string();
            }
        }
    }

    pub fn set_scrollback(&self, id: &PaneId, content: &str) {
        let mut state = self.inner.lock();
        for panes in state.sessions.values_mut() {
            if let Some(pane) = panes.get_mut(id) {
                pane.scrollback = content.to_string();
            }
        }
    }

    /// Append to a pane's scrollback, as an agent producing output would.
    pub fn append_scrollback(&self, id: &PaneId, content: &str) {
        let mut state = self.inner.lock();
        for panes in state.sessions.values_mut() {
            if let Some(pane) = panes.get_mut(id) {
                pane.scrollback.push_str(content);
            }
        }
    }

    pub fn set_last_activity(&self, id: &PaneId, epoch_ms: u64) {
        let mut state = self.inner.lock();
        for panes in state.sessions.values_mut() {
            if let Some(pane) = panes.get_mut(id) {
                pane.last_activity_ms = epoch_ms;
            }
        }
    }

    /// Text sent to a pane so far, with the enter flag.
    pub fn sent_keys(&self, id: &PaneId) -> Vec<(String, bool)> {
        let state = self.inner.lock();
        state
            .sessions
            .values()
            .find_map(|panes| panes.get(id))
            .map(|pane| pane.sent.clone())
            .unwrap_or_default()
    }

    pub fn pane(&self, id: &PaneId) -> Option<FakePane> {
        let state = self.inner.lock();
        state
            .sessions
            .values()
            .find_map(|panes| panes.get(id))
            .cloned()
    }

    fn with_pane<T>(
        &self,
        id: &PaneId,
        f: impl FnOnce(&mut FakePane) -> T,
    ) -> Result<T, MuxError> {
        let mut state = self.inner.lock();
        for panes in state.sessions.values_mut() {
            if let Some(pane) = panes.get_mut(id) {
                return Ok(f(pane));
            }
        }
        Err(MuxError::PaneNotFound(id.to_string()))
    }
}

#[async_trait]
impl MuxClient for FakeMux {
    async fn list_sessions(&self) -> Result<Vec<String>, MuxError> {
        let mut names: Vec<String> = self.inner.lock().sessions.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn list_panes(&self, session: &str) -> Result<Vec<Pane>, MuxError> {
        let state = self.inner.lock();
        let panes = state
            .sessions
            .get(session)
            .ok_or_else(|| MuxError::SessionNotFound(session.to_string()))?;
        let mut listed: Vec<Pane> = panes
            .iter()
            .map(|(id, pane)| Pane {
                id: id.clone(),
                index: pane.index,
                title: pane.title.clone(),
                variant: pane.variant.clone(),
            })
            .collect();
        listed.sort_by_key(|p| p.index);
        Ok(listed)
    }

    async fn capture_pane(&self, id: &PaneId, lines: u32) -> Result<String, MuxError> {
        self.with_pane(id, |pane| {
            let all: Vec<&str> = pane.scrollback.lines().collect();
            let keep = all.len().saturating_sub(lines as usize);
            all[keep..].join("\n")
        })
    }

    async fn send_keys(&self, id: &PaneId, text: &str, enter: bool) -> Result<(), MuxError> {
        self.with_pane(id, |pane| pane.sent.push((text.to_string(), enter)))
    }

    async fn set_pane_title(&self, id: &PaneId, title: &str) -> Result<(), MuxError> {
        self.with_pane(id, |pane| pane.title = title.to_string())
    }

    async fn split_window(&self, session: &str, _cwd: &Path) -> Result<PaneId, MuxError> {
        let mut state = self.inner.lock();
        if !state.sessions.contains_key(session) {
            return Err(MuxError::SessionNotFound(session.to_string()));
        }
        state.next_pane += 1;
        let id = PaneId::new(format!("%{}", state.next_pane));
        let index = state
            .sessions
            .get(session)
            .map(|p| p.len() as u32)
            .unwrap_or(0);
        if let Some(panes) = state.sessions.get_mut(session) {
            panes.insert(
                id.clone(),
                FakePane {
                    index,
                    ..Default::default()
                },
            );
        }
        Ok(id)
    }

    async fn kill_session(&self, session: &str) -> Result<(), MuxError> {
        let mut state = self.inner.lock();
        state
            .sessions
            .remove(session)
            .map(|_| ())
            .ok_or_else(|| MuxError::SessionNotFound(session.to_string()))
    }

    async fn pane_last_activity(&self, id: &PaneId) -> Result<u64, MuxError> {
        self.with_pane(id, |pane| pane.last_activity_ms)
    }
}
