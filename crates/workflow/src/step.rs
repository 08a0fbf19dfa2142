// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow step tree.

use muster_core::AgentFamily;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Iteration cap applied to every loop shape.
pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000;

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnError {
    /// Abort the enclosing loop or pipeline
    Fail,
    /// Alias of `fail` kept for template compatibility
    FailFast,
    /// Log and move on
    Continue,
}

impl OnError {
    pub fn aborts(&self) -> bool {
        matches!(self, OnError::Fail | OnError::FailFast)
    }
}

/// One step in a workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    pub kind: StepKind,
    /// Condition gating this step (and `break`/`continue` controls)
    pub when: Option<String>,
    pub on_error: Option<OnError>,
}

/// Step payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Dispatch a prompt to an agent pane
    Agent {
        agent_type: AgentFamily,
        model: Option<String>,
        prompt: String,
    },
    /// A nested loop
    Loop(Box<LoopStep>),
    /// Leave the enclosing loop
    Break,
    /// Skip to the next iteration
    Continue,
}

/// A loop over nested steps.
///
/// Shape priority: `for-each` when `items` is set, then `while` when
/// `condition` is set, otherwise `times` (0 is a valid no-op).
#[derive(Debug, Clone, PartialEq)]
pub struct LoopStep {
    pub items: Option<String>,
    pub condition: Option<String>,
    pub times: Option<u64>,
    /// Loop variable name, default `item`
    pub alias: String,
    /// Variable receiving the collected per-iteration results
    pub collect: Option<String>,
    /// Pause between iterations
    pub delay: Duration,
    pub max_iterations: u64,
    pub steps: Vec<Step>,
}

impl Default for LoopStep {
    fn default() -> Self {
        Self {
            items: None,
            condition: None,
            times: None,
            alias: "item".to_string(),
            collect: None,
            delay: Duration::ZERO,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            steps: Vec::new(),
        }
    }
}

impl Step {
    pub fn agent(id: &str, agent_type: AgentFamily, prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: StepKind::Agent {
                agent_type,
                model: None,
                prompt: prompt.to_string(),
            },
            when: None,
            on_error: None,
        }
    }

    pub fn looped(id: &str, spec: LoopStep) -> Self {
        Self {
            id: id.to_string(),
            kind: StepKind::Loop(Box::new(spec)),
            when: None,
            on_error: None,
        }
    }

    pub fn control(id: &str, kind: StepKind, when: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            kind,
            when: when.map(str::to_string),
            on_error: None,
        }
    }
}
