// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline execution state.
//!
//! One `PipelineExecution` records a single run of a workflow: per-step
//! results keyed by step id, shared variables, and progress recomputed
//! from the step map on every read.

use crate::agent::{AgentFamily, PaneId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

crate::define_id! {
    /// Identifier of one pipeline run.
    pub struct RunId;
}

/// Status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    Cancelled,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Status of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// Result of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<AgentFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane_used: Option<PaneId>,
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<serde_json::Value>,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn pending(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            agent_type: None,
            pane_used: None,
            output: String::new(),
            parsed_data: None,
            started_at_ms: 0,
            finished_at_ms: None,
            error: None,
        }
    }
}

/// Aggregate progress over a run's step map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub running: usize,
    pub pending: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `round(100·(completed+failed+skipped)/total)`, 0 when total is 0
    pub percent: u8,
}

/// State of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineExecution {
    pub run_id: RunId,
    pub workflow_id: String,
    pub session: String,
    pub status: RunStatus,
    /// Step results in execution order
    pub steps: IndexMap<String, StepResult>,
    pub variables: HashMap<String, serde_json::Value>,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
}

impl PipelineExecution {
    pub fn new(
        run_id: RunId,
        workflow_id: impl Into<String>,
        session: impl Into<String>,
        started_at_ms: u64,
    ) -> Self {
        Self {
            run_id,
            workflow_id: workflow_id.into(),
            session: session.into(),
            status: RunStatus::Running,
            steps: IndexMap::new(),
            variables: HashMap::new(),
            started_at_ms,
            finished_at_ms: None,
        }
    }

    /// Recompute progress from the step map.
    pub fn progress(&self) -> Progress {
        let mut p = Progress {
            total: self.steps.len(),
            ..Default::default()
        };
        for step in self.steps.values() {
            match step.status {
                StepStatus::Completed => p.completed += 1,
                StepStatus::Running => p.running += 1,
                StepStatus::Pending => p.pending += 1,
                StepStatus::Failed => p.failed += 1,
                StepStatus::Skipped => p.skipped += 1,
                StepStatus::Cancelled => p.failed += 1,
            }
        }
        if p.total > 0 {
            let done = (p.completed + p.failed + p.skipped) as f64;
            p.percent = ((100.0 * done / p.total as f64).round()) as u8;
        }
        p
    }

    /// Store a step result, replacing any earlier result for the same id.
    pub fn record_step(&mut self, result: StepResult) {
        self.steps.insert(result.step_id.clone(), result);
    }

    pub fn finish(&mut self, status: RunStatus, finished_at_ms: u64) {
        self.status = status;
        self.finished_at_ms = Some(finished_at_ms);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
