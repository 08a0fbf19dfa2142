// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow templates.
//!
//! A template names its agents, a coordination shape, the stage flow
//! with transitions, and error-handling defaults. Templates are YAML;
//! validation collects every problem rather than stopping at the first.

use muster_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One agent slot in a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Persona/profile name to load
    pub profile: String,
    /// Role within the workflow, e.g. "author", "reviewer"
    pub role: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

/// How the agents coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Coordination {
    PingPong,
    Pipeline,
    Parallel,
    ReviewGate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    #[default]
    Any,
    All,
    Quorum,
}

/// A stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub trigger: String,
}

/// Stage flow of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default)]
    pub approval_mode: ApprovalMode,
    #[serde(default = "default_quorum")]
    pub quorum: u32,
}

fn default_quorum() -> u32 {
    1
}

/// Error-handling defaults for a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorHandling {
    #[serde(default = "default_restart")]
    pub on_agent_crash: String,
    #[serde(default = "default_retry")]
    pub on_agent_error: String,
    #[serde(default = "default_fail")]
    pub on_timeout: String,
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_minutes: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries_per_stage: u32,
}

fn default_restart() -> String {
    "restart".to_string()
}
fn default_retry() -> String {
    "retry".to_string()
}
fn default_fail() -> String {
    "fail".to_string()
}
fn default_stage_timeout() -> u32 {
    30
}
fn default_max_retries() -> u32 {
    2
}

impl Default for ErrorHandling {
    fn default() -> Self {
        Self {
            on_agent_crash: default_restart(),
            on_agent_error: default_retry(),
            on_timeout: default_fail(),
            stage_timeout_minutes: default_stage_timeout(),
            max_retries_per_stage: default_max_retries(),
        }
    }
}

/// A named workflow template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
    pub coordination: Coordination,
    #[serde(default)]
    pub flow: Flow,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default)]
    pub error_handling: ErrorHandling,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

impl WorkflowTemplate {
    /// Parse and validate a YAML template.
    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateError> {
        let template: WorkflowTemplate = serde_yaml::from_str(yaml)?;
        template.validate().into_result()?;
        Ok(template)
    }

    /// Collect every validation issue.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !valid_name(&self.name) {
            errors.push_value("name", "must match [a-z][a-z0-9_-]*", &self.name);
        }
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.profile.trim().is_empty() {
                errors.push(format!("agents[{}].profile", i), "is required");
            }
            if agent.role.trim().is_empty() {
                errors.push(format!("agents[{}].role", i), "is required");
            }
        }
        if self.flow.approval_mode == ApprovalMode::Quorum && self.flow.quorum < 1 {
            errors.push("flow.quorum", "must be at least 1 in quorum mode");
        }
        if let Some(initial) = &self.flow.initial {
            if !self.flow.stages.is_empty() && !self.flow.stages.contains(initial) {
                errors.push_value("flow.initial", "is not a declared stage", initial);
            }
        }
        for (i, transition) in self.flow.transitions.iter().enumerate() {
            for (field, stage) in [("from", &transition.from), ("to", &transition.to)] {
                if !self.flow.stages.is_empty() && !self.flow.stages.contains(stage) {
                    errors.push_value(
                        format!("flow.transitions[{}].{}", i, field),
                        "is not a declared stage",
                        stage,
                    );
                }
            }
            if transition.trigger.trim().is_empty() {
                errors.push(format!("flow.transitions[{}].trigger", i), "is required");
            }
        }
        errors
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
