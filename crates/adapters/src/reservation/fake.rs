// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake reservation service for testing

use super::{
    GrantedReservation, ReservationClient, ReservationConflict, ReservationError, ReserveOutcome,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Hold {
    id: String,
    project: String,
    agent: String,
    path: String,
    exclusive: bool,
    reserved_at_ms: u64,
    expires_at_ms: u64,
}

#[derive(Default)]
struct FakeReservationState {
    holds: Vec<Hold>,
    next_id: u64,
    now_ms: u64,
    // path -> remaining number of reserve calls to reject unconditionally
    injected_conflicts: HashMap<String, u32>,
    renew_calls: Vec<(String, u64)>,
}

/// In-memory reservation server for tests.
///
/// Conflict semantics: a path conflicts when another live hold exists on
/// the same pattern and either side wants exclusivity. Same-agent
/// re-reservation renews the hold. `inject_conflict` forces the next N
/// attempts on a path to lose, which is how transfer retry and rollback
/// paths get exercised.
#[derive(Clone)]
pub struct FakeReservations {
    inner: Arc<Mutex<FakeReservationState>>,
}

impl Default for FakeReservations {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeReservationState {
                now_ms: 1_000_000,
                ..Default::default()
            })),
        }
    }
}

impl FakeReservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.inner.lock().now_ms += ms;
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.lock().now_ms
    }

    /// Force the next `count` reserve attempts on `path` to conflict.
    pub fn inject_conflict(&self, path: &str, count: u32) {
        self.inner
            .lock()
            .injected_conflicts
            .insert(path.to_string(), count);
    }

    /// Agents currently holding `path` (live holds only).
    pub fn holders_of(&self, path: &str) -> Vec<String> {
        let state = self.inner.lock();
        let now = state.now_ms;
        state
            .holds
            .iter()
            .filter(|h| h.path == path && h.expires_at_ms > now)
            .map(|h| h.agent.clone())
            .collect()
    }

    /// Live paths held by `agent`, sorted.
    pub fn paths_of(&self, agent: &str) -> Vec<String> {
        let state = self.inner.lock();
        let now = state.now_ms;
        let mut paths: Vec<String> = state
            .holds
            .iter()
            .filter(|h| h.agent == agent && h.expires_at_ms > now)
            .map(|h| h.path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// (agent, extend_s) pairs from renew calls, in order.
    pub fn renew_calls(&self) -> Vec<(String, u64)> {
        self.inner.lock().renew_calls.clone()
    }
}

#[async_trait]
impl ReservationClient for FakeReservations {
    async fn reserve(
        &self,
        project: &str,
        agent: &str,
        paths: &[String],
        ttl_s: u64,
        exclusive: bool,
        _reason: &str,
    ) -> Result<ReserveOutcome, ReservationError> {
        let mut state = self.inner.lock();
        let now = state.now_ms;
        state.holds.retain(|h| h.expires_at_ms > now);

        let mut outcome = ReserveOutcome::default();
        for path in paths {
            if let Some(remaining) = state.injected_conflicts.get_mut(path) {
                if *remaining > 0 {
                    *remaining -= 1;
                    outcome.conflicts.push(ReservationConflict {
                        path: path.clone(),
                        holders: vec!["injected".to_string()],
                        holder_ids: vec!["injected".to_string()],
                        reserved_since_ms: None,
                        expires_at_ms: None,
                    });
                    continue;
                }
            }

            let blocking: Vec<&Hold> = state
                .holds
                .iter()
                .filter(|h| {
                    h.project == project
                        && h.path == *path
                        && h.agent != agent
                        && (exclusive || h.exclusive)
                })
                .collect();
            if !blocking.is_empty() {
                outcome.conflicts.push(ReservationConflict {
                    path: path.clone(),
                    holders: blocking.iter().map(|h| h.agent.clone()).collect(),
                    holder_ids: blocking.iter().map(|h| h.id.clone()).collect(),
                    reserved_since_ms: blocking.iter().map(|h| h.reserved_at_ms).min(),
                    expires_at_ms: blocking.iter().map(|h| h.expires_at_ms).max(),
                });
                continue;
            }

            // Same-agent re-reservation renews in place
            if let Some(hold) = state
                .holds
                .iter_mut()
                .find(|h| h.project == project && h.path == *path && h.agent == agent)
            {
                hold.expires_at_ms = now + ttl_s * 1_000;
                hold.exclusive = exclusive;
                outcome.granted.push(GrantedReservation {
                    id: hold.id.clone(),
                    path_pattern: hold.path.clone(),
                    exclusive: hold.exclusive,
                    expires_at_ms: hold.expires_at_ms,
                });
                continue;
            }

            state.next_id += 1;
            let hold = Hold {
                id: format!("res-{}", state.next_id),
                project: project.to_string(),
                agent: agent.to_string(),
                path: path.clone(),
                exclusive,
                reserved_at_ms: now,
                expires_at_ms: now + ttl_s * 1_000,
            };
            outcome.granted.push(GrantedReservation {
                id: hold.id.clone(),
                path_pattern: hold.path.clone(),
                exclusive: hold.exclusive,
                expires_at_ms: hold.expires_at_ms,
            });
            state.holds.push(hold);
        }
        Ok(outcome)
    }

    async fn release(
        &self,
        project: &str,
        agent: &str,
        paths: &[String],
        ids: &[String],
    ) -> Result<(), ReservationError> {
        let mut state = self.inner.lock();
        state.holds.retain(|h| {
            let by_path = h.project == project && h.agent == agent && paths.contains(&h.path);
            let by_id = ids.contains(&h.id);
            !(by_path || by_id)
        });
        Ok(())
    }

    async fn renew(
        &self,
        project: &str,
        agent: &str,
        extend_s: u64,
    ) -> Result<(), ReservationError> {
        let mut state = self.inner.lock();
        let now = state.now_ms;
        state.renew_calls.push((agent.to_string(), extend_s));
        for hold in state
            .holds
            .iter_mut()
            .filter(|h| h.project == project && h.agent == agent)
        {
            hold.expires_at_ms = now + extend_s * 1_000;
        }
        Ok(())
    }
}
