// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline run registry.
//!
//! Process-wide map from run id to live execution state. Progress is
//! recomputed from the step map on every read. Inject a local registry
//! where testability matters; the global exists for the CLI surface.

use crate::state::ExecState;
use muster_core::{PipelineExecution, RunId, RunStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tokio_util::sync::CancellationToken;

/// A registered run: shared state plus its cancellation token.
#[derive(Clone)]
pub struct RunHandle {
    pub state: Arc<ExecState>,
    pub cancel: CancellationToken,
}

/// Registry of pipeline runs.
#[derive(Default)]
pub struct PipelineRegistry {
    runs: Mutex<HashMap<RunId, RunHandle>>,
}

static GLOBAL: LazyLock<PipelineRegistry> = LazyLock::new(PipelineRegistry::default);

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static PipelineRegistry {
        &GLOBAL
    }

    /// Register a run, returning its handle.
    pub fn register(&self, state: Arc<ExecState>) -> RunHandle {
        let handle = RunHandle {
            state: Arc::clone(&state),
            cancel: CancellationToken::new(),
        };
        self.runs
            .lock()
            .insert(state.run_id(), handle.clone());
        handle
    }

    /// Snapshot of one run.
    pub fn get(&self, run_id: &RunId) -> Option<PipelineExecution> {
        let handle = self.runs.lock().get(run_id).cloned()?;
        Some(handle.state.snapshot())
    }

    /// Snapshots of every run, oldest first.
    pub fn list(&self) -> Vec<PipelineExecution> {
        let handles: Vec<RunHandle> = self.runs.lock().values().cloned().collect();
        let mut runs: Vec<PipelineExecution> =
            handles.iter().map(|h| h.state.snapshot()).collect();
        runs.sort_by(|a, b| {
            a.started_at_ms
                .cmp(&b.started_at_ms)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        runs
    }

    /// Cancel a run. True when the run exists.
    pub fn cancel(&self, run_id: &RunId) -> bool {
        match self.runs.lock().get(run_id) {
            Some(handle) => {
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop terminal runs, returning how many were removed.
    pub fn clear_finished(&self) -> usize {
        let mut runs = self.runs.lock();
        let before = runs.len();
        runs.retain(|_, handle| handle.state.snapshot().status == RunStatus::Running);
        before - runs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, started_at_ms: u64) -> Arc<ExecState> {
        Arc::new(ExecState::new(PipelineExecution::new(
            RunId::new(id),
            "wf",
            "dev",
            started_at_ms,
        )))
    }

    #[test]
    fn register_get_list() {
        let registry = PipelineRegistry::new();
        registry.register(run("run-b", 2_000));
        registry.register(run("run-a", 1_000));

        assert!(registry.get(&RunId::new("run-a")).is_some());
        assert!(registry.get(&RunId::new("run-x")).is_none());
        let ids: Vec<String> = registry
            .list()
            .into_iter()
            .map(|r| r.run_id.0)
            .collect();
        assert_eq!(ids, vec!["run-a", "run-b"]);
    }

    #[test]
    fn cancel_trips_the_token() {
        let registry = PipelineRegistry::new();
        let handle = registry.register(run("run-a", 1_000));
        assert!(!handle.cancel.is_cancelled());
        assert!(registry.cancel(&RunId::new("run-a")));
        assert!(handle.cancel.is_cancelled());
        assert!(!registry.cancel(&RunId::new("run-x")));
    }

    #[test]
    fn clear_finished_keeps_running_runs() {
        let registry = PipelineRegistry::new();
        let finished = run("run-done", 1_000);
        finished.finish(RunStatus::Completed, 2_000);
        registry.register(finished);
        registry.register(run("run-live", 1_500));

        assert_eq!(registry.clear_finished(), 1);
        assert!(registry.get(&RunId::new("run-live")).is_some());
        assert!(registry.get(&RunId::new("run-done")).is_none());
    }

    #[test]
    fn progress_is_recomputed_on_read() {
        let registry = PipelineRegistry::new();
        let state = run("run-a", 1_000);
        registry.register(Arc::clone(&state));

        let mut result = muster_core::StepResult::pending("s1");
        result.status = muster_core::StepStatus::Completed;
        state.record_step(result);

        let snapshot = registry.get(&RunId::new("run-a")).unwrap();
        assert_eq!(snapshot.progress().percent, 100);
    }
}
