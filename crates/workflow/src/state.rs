// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared execution state.
//!
//! One `ExecState` per run. Variables and step results live behind a
//! single reader/writer lock; there is no cross-executor sharing.

use muster_core::{PipelineExecution, RunId, RunStatus, StepResult};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Lock-guarded state of one pipeline run.
pub struct ExecState {
    inner: RwLock<PipelineExecution>,
}

impl ExecState {
    pub fn new(execution: PipelineExecution) -> Self {
        Self {
            inner: RwLock::new(execution),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.inner.read().run_id.clone()
    }

    /// Current snapshot, progress included on read.
    pub fn snapshot(&self) -> PipelineExecution {
        self.inner.read().clone()
    }

    pub fn set_var(&self, name: &str, value: Value) {
        self.inner.write().variables.insert(name.to_string(), value);
    }

    pub fn remove_var(&self, name: &str) {
        self.inner.write().variables.remove(name);
    }

    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.inner.read().variables.get(name).cloned()
    }

    pub fn vars(&self) -> HashMap<String, Value> {
        self.inner.read().variables.clone()
    }

    /// Store a step result under the writer lock.
    pub fn record_step(&self, result: StepResult) {
        self.inner.write().record_step(result);
    }

    pub fn step(&self, step_id: &str) -> Option<StepResult> {
        self.inner.read().steps.get(step_id).cloned()
    }

    pub fn finish(&self, status: RunStatus, finished_at_ms: u64) {
        self.inner.write().finish(status, finished_at_ms);
    }
}
