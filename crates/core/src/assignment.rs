// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assignment records and their status state machine.
//!
//! Valid transitions: assigned → {working, failed}; working → {completed,
//! failed, reassigned}; failed → {assigned}. completed and reassigned are
//! terminal.

use crate::agent::AgentFamily;
use crate::triage::BeadId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Per-term decomposition of an assignment score.
///
/// `total = base + bonuses − penalties`. Penalty fields are stored as
/// positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub agent_type_bonus: f64,
    pub critical_path_bonus: f64,
    pub profile_tag_bonus: f64,
    pub focus_pattern_bonus: f64,
    pub file_overlap_penalty: f64,
    pub context_penalty: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base
            + self.agent_type_bonus
            + self.critical_path_bonus
            + self.profile_tag_bonus
            + self.focus_pattern_bonus
            - self.file_overlap_penalty
            - self.context_penalty
    }

    /// Terms worth mentioning in a human-readable reason line.
    pub fn salient_terms(&self) -> Vec<(&'static str, f64)> {
        let mut terms = Vec::new();
        if self.agent_type_bonus.abs() >= 0.05 {
            terms.push(("agent match", self.agent_type_bonus));
        }
        if self.critical_path_bonus >= 0.05 {
            terms.push(("critical path", self.critical_path_bonus));
        }
        if self.profile_tag_bonus > 0.0 {
            terms.push(("profile tags", self.profile_tag_bonus));
        }
        if self.focus_pattern_bonus > 0.0 {
            terms.push(("focus files", self.focus_pattern_bonus));
        }
        if self.file_overlap_penalty > 0.0 {
            terms.push(("file overlap", -self.file_overlap_penalty));
        }
        if self.context_penalty > 0.0 {
            terms.push(("context usage", -self.context_penalty));
        }
        terms
    }
}

/// Lifecycle status of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Assigned,
    Working,
    Completed,
    Failed,
    Reassigned,
}

impl AssignmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Reassigned)
    }

    pub fn can_transition(&self, to: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, to),
            (Assigned, Working)
                | (Assigned, Failed)
                | (Working, Completed)
                | (Working, Failed)
                | (Working, Reassigned)
                | (Failed, Assigned)
        )
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Working => "working",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Failed => "failed",
            AssignmentStatus::Reassigned => "reassigned",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
}

/// A bead dispatched to a specific agent pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub bead_id: BeadId,
    pub bead_title: String,
    pub pane_index: u32,
    pub agent_type: AgentFamily,
    pub agent_name: String,
    pub priority: u8,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Strategy-specific human-readable reason
    #[serde(default)]
    pub reason: String,
    /// Selection confidence in [0.1, 0.95]
    #[serde(default)]
    pub confidence: f64,
    pub assigned_at_ms: u64,
    #[serde(default)]
    pub reserved_files: Vec<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_pane: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_fail_reason: Option<String>,
    pub status: AssignmentStatus,
}

impl Assignment {
    /// Apply a status transition, rejecting invalid edges.
    pub fn transition(&mut self, to: AssignmentStatus) -> Result<(), AssignmentError> {
        if !self.status.can_transition(to) {
            return Err(AssignmentError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Record a failure: the reason is kept for the next attempt and
    /// the retry count is bumped.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), AssignmentError> {
        self.transition(AssignmentStatus::Failed)?;
        self.retry_count += 1;
        self.previous_fail_reason = Some(reason.into());
        Ok(())
    }

    /// Build the successor assignment after a reassignment.
    ///
    /// The predecessor must be failed or already moved to `Reassigned`;
    /// the successor starts fresh on the new pane with provenance and
    /// the accumulated retry count carried over.
    pub fn reassigned_to(
        &self,
        pane_index: u32,
        agent_type: AgentFamily,
        agent_name: impl Into<String>,
        assigned_at_ms: u64,
    ) -> Assignment {
        Assignment {
            bead_id: self.bead_id.clone(),
            bead_title: self.bead_title.clone(),
            pane_index,
            agent_type,
            agent_name: agent_name.into(),
            priority: self.priority,
            score: self.score,
            breakdown: self.breakdown,
            reason: self.reason.clone(),
            confidence: self.confidence,
            assigned_at_ms,
            reserved_files: Vec::new(),
            retry_count: self.retry_count,
            previous_pane: Some(self.pane_index),
            previous_agent: Some(self.agent_name.clone()),
            previous_fail_reason: self.previous_fail_reason.clone(),
            status: AssignmentStatus::Assigned,
        }
    }
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
