// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation watcher.
//!
//! Polls tracked panes, extracts freshly edited paths from their
//! scrollback, and reserves them for the pane's agent. Conflicts go out
//! on the conflict channel; the watcher itself never retries. Active
//! reservations are renewed at half-TTL cadence.

use crate::extract::extract_paths;
use muster_adapters::{EventSender, MuxClient, ReservationClient};
use muster_core::{AgentFamily, Clock, CoordEvent, FileConflict, PaneId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Watcher configuration.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub project: String,
    /// Reservations are scoped to a project directory; without one the
    /// watcher observes but never reserves
    pub project_dir: Option<PathBuf>,
    pub session: String,
    pub poll_interval: Duration,
    pub ttl_s: u64,
    pub capture_lines: u32,
}

impl WatcherConfig {
    pub fn new(project: &str, project_dir: Option<PathBuf>, session: &str) -> Self {
        Self {
            project: project.to_string(),
            project_dir,
            session: session.to_string(),
            poll_interval: crate::env::watch_poll_interval(),
            ttl_s: crate::env::reservation_ttl_s(),
            capture_lines: 50,
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedPane {
    agent: String,
    family: AgentFamily,
    reserved: HashSet<String>,
}

/// Watches a fleet's panes and mediates reservations for them.
pub struct ReservationWatcher<M: MuxClient, R: ReservationClient, C: Clock> {
    config: WatcherConfig,
    mux: M,
    client: Option<R>,
    clock: Arc<C>,
    conflict_tx: mpsc::Sender<FileConflict>,
    events: EventSender,
    tracked: Mutex<HashMap<PaneId, TrackedPane>>,
}

impl<M: MuxClient, R: ReservationClient, C: Clock> ReservationWatcher<M, R, C> {
    pub fn new(
        config: WatcherConfig,
        mux: M,
        client: Option<R>,
        clock: Arc<C>,
        conflict_tx: mpsc::Sender<FileConflict>,
        events: EventSender,
    ) -> Self {
        Self {
            config,
            mux,
            client,
            clock,
            conflict_tx,
            events,
            tracked: Mutex::new(HashMap::new()),
        }
    }

    /// Start observing a pane for the given agent.
    pub fn track_pane(&self, pane_id: PaneId, agent: &str, family: AgentFamily) {
        self.tracked.lock().insert(
            pane_id,
            TrackedPane {
                agent: agent.to_string(),
                family,
                reserved: HashSet::new(),
            },
        );
    }

    pub fn untrack_pane(&self, pane_id: &PaneId) {
        self.tracked.lock().remove(pane_id);
    }

    /// Paths currently reserved through this watcher for a pane.
    pub fn reserved_paths(&self, pane_id: &PaneId) -> Vec<String> {
        let tracked = self.tracked.lock();
        let mut paths: Vec<String> = tracked
            .get(pane_id)
            .map(|t| t.reserved.iter().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    /// One poll pass over every tracked pane.
    pub async fn poll_once(&self) {
        let snapshot: Vec<(PaneId, TrackedPane)> = self
            .tracked
            .lock()
            .iter()
            .map(|(id, t)| (id.clone(), t.clone()))
            .collect();

        for (pane_id, tracked) in snapshot {
            let output = match self
                .mux
                .capture_pane(&pane_id, self.config.capture_lines)
                .await
            {
                Ok(output) => output,
                Err(e) => {
                    tracing::debug!(pane = %pane_id, error = %e, "capture failed, skipping pane");
                    continue;
                }
            };
            let new_paths: Vec<String> = extract_paths(tracked.family, &output)
                .into_iter()
                .filter(|p| !tracked.reserved.contains(p))
                .collect();
            if !new_paths.is_empty() {
                self.on_file_edit(&pane_id, &new_paths).await;
            }
        }
    }

    /// Reserve freshly observed paths for a pane's agent.
    ///
    /// A no-op when no reservation client or project directory is
    /// configured.
    pub async fn on_file_edit(&self, pane_id: &PaneId, paths: &[String]) {
        let Some(client) = &self.client else { return };
        if self.config.project_dir.is_none() {
            return;
        }
        let Some(tracked) = self.tracked.lock().get(pane_id).cloned() else {
            return;
        };

        let outcome = match client
            .reserve(
                &self.config.project,
                &tracked.agent,
                paths,
                self.config.ttl_s,
                true,
                "auto-reserved from pane output",
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(pane = %pane_id, error = %e, "reserve failed");
                return;
            }
        };

        if !outcome.granted.is_empty() {
            let mut tracked_map = self.tracked.lock();
            if let Some(entry) = tracked_map.get_mut(pane_id) {
                for grant in &outcome.granted {
                    entry.reserved.insert(grant.path_pattern.clone());
                }
            }
        }

        let now_ms = self.clock.epoch_ms();
        for conflict in outcome.conflicts {
            let record = FileConflict {
                path: conflict.path,
                requestor_agent: tracked.agent.clone(),
                requestor_pane: pane_id.clone(),
                session: self.config.session.clone(),
                holders: conflict.holders,
                holder_ids: conflict.holder_ids,
                reserved_since_ms: conflict.reserved_since_ms,
                expires_at_ms: conflict.expires_at_ms,
                detected_at_ms: now_ms,
            };
            self.events.emit(CoordEvent::FileConflict {
                conflict: record.clone(),
            });
            if self.conflict_tx.send(record).await.is_err() {
                tracing::debug!("conflict channel closed");
            }
        }
    }

    /// Renew every tracked agent's reservations; failures are logged,
    /// never fatal.
    pub async fn renew_once(&self) {
        let Some(client) = &self.client else { return };
        let snapshot: Vec<TrackedPane> = self
            .tracked
            .lock()
            .values()
            .filter(|t| !t.reserved.is_empty())
            .cloned()
            .collect();

        for tracked in snapshot {
            match client
                .renew(&self.config.project, &tracked.agent, self.config.ttl_s)
                .await
            {
                Ok(()) => self.events.emit(CoordEvent::ReservationRenewed {
                    agent: tracked.agent.clone(),
                    count: tracked.reserved.len(),
                }),
                Err(e) => {
                    tracing::warn!(agent = %tracked.agent, error = %e, "renew failed");
                }
            }
        }
    }

    /// Run the poll and renewal loops until shutdown.
    pub async fn run(&self, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let renew_every = Duration::from_secs((self.config.ttl_s / 2).max(1));
        let mut renew = tokio::time::interval(renew_every);
        renew.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = poll.tick() => self.poll_once().await,
                _ = renew.tick() => self.renew_once().await,
                _ = &mut shutdown_rx => {
                    tracing::debug!(session = %self.config.session, "watcher shutdown requested");
                    break;
                }
            }
        }
    }
}

/// Spawn a watcher loop. Returns the shutdown sender.
pub fn start_watcher<M: MuxClient, R: ReservationClient, C: Clock + 'static>(
    watcher: Arc<ReservationWatcher<M, R, C>>,
) -> oneshot::Sender<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        watcher.run(shutdown_rx).await;
    });
    shutdown_tx
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
