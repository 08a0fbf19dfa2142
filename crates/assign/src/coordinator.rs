// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator: idle-agent tracking and dispatch.
//!
//! Holds the current recommendation pool, scores it against idle agents,
//! sends assignment mail, persists the results, and emits work-assigned
//! events on the non-blocking coordination stream.

use crate::score::{AgentCandidate, ScoreConfig};
use crate::strategy::{select_assignments, SelectedPair, Strategy};
use muster_adapters::{
    EventSender, Importance, MailClient, MailError, SendMessage, TriageClient, TriageError,
};
use muster_core::{
    Assignment, AssignmentError, AssignmentStatus, BeadId, Clock, CoordEvent,
    TriageRecommendation,
};
use muster_storage::{AssignmentRegistry, AssignmentStoreError};
use std::sync::Arc;
use thiserror::Error;

/// Context usage above which an agent is not assignable.
pub const MAX_ASSIGNABLE_CONTEXT_PCT: f64 = 90.0;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("triage: {0}")]
    Triage(#[from] TriageError),
    #[error(transparent)]
    Store(#[from] AssignmentStoreError),
    #[error("no eligible agent to take bead {0}")]
    NoEligibleAgent(BeadId),
    #[error("mail: {0}")]
    Mail(#[from] MailError),
}

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub project: String,
    pub project_key: String,
    pub session: String,
    pub strategy: Strategy,
    pub score: ScoreConfig,
    /// Sender name on assignment mail
    pub sender: String,
}

impl CoordinatorConfig {
    pub fn new(project: &str, project_key: &str, session: &str) -> Self {
        Self {
            project: project.to_string(),
            project_key: project_key.to_string(),
            session: session.to_string(),
            strategy: Strategy::default(),
            score: ScoreConfig::default(),
            sender: "muster".to_string(),
        }
    }
}

/// A non-mutating assignment suggestion for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub bead_id: BeadId,
    pub title: String,
    pub score: f64,
    pub reason: String,
    pub confidence: f64,
}

/// Work assignment coordinator for one session.
pub struct Coordinator<L: MailClient, T: TriageClient, C: Clock> {
    config: CoordinatorConfig,
    mail: L,
    triage: T,
    clock: Arc<C>,
    events: EventSender,
    recommendations: Vec<TriageRecommendation>,
}

impl<L: MailClient, T: TriageClient, C: Clock> Coordinator<L, T, C> {
    pub fn new(
        config: CoordinatorConfig,
        mail: L,
        triage: T,
        clock: Arc<C>,
        events: EventSender,
    ) -> Self {
        Self {
            config,
            mail,
            triage,
            clock,
            events,
            recommendations: Vec::new(),
        }
    }

    fn registry(&self) -> AssignmentRegistry {
        AssignmentRegistry::open(&self.config.session, &self.config.project_key)
    }

    /// Pull fresh recommendations from beads, dropping blocked ones.
    pub async fn refresh_recommendations(&mut self) -> Result<usize, CoordinatorError> {
        let mut recommendations = self.triage.recommendations(&self.config.project).await?;
        recommendations.retain(|r| !r.is_blocked());
        let count = recommendations.len();
        self.recommendations = recommendations;
        Ok(count)
    }

    /// The current unblocked recommendation pool.
    pub fn assignable_work(&self) -> &[TriageRecommendation] {
        &self.recommendations
    }

    /// One assignment tick over the given agents.
    ///
    /// Agents must be idle with context usage at or below 90% to take
    /// work. A mail failure aborts that single pair, never the batch.
    pub async fn assign_work(&mut self, agents: &[AgentCandidate]) -> Vec<Assignment> {
        let eligible: Vec<AgentCandidate> = agents
            .iter()
            .filter(|a| a.state.is_idle() && a.context_pct <= MAX_ASSIGNABLE_CONTEXT_PCT)
            .cloned()
            .collect();
        if eligible.is_empty() || self.recommendations.is_empty() {
            return Vec::new();
        }

        let pairs = select_assignments(
            self.config.strategy,
            &eligible,
            &self.recommendations,
            &self.config.score,
        );

        let registry = self.registry();
        let mut placed = Vec::new();
        let mut used_recs = Vec::new();

        for pair in pairs {
            let agent = &eligible[pair.agent_index];
            let rec = &self.recommendations[pair.task_index];

            if let Err(e) = self.mail.send_message(assignment_mail(
                &self.config.project,
                &self.config.sender,
                agent,
                rec,
                &pair,
            ))
            .await
            {
                tracing::warn!(
                    bead = %rec.bead_id,
                    agent = %agent.name,
                    error = %e,
                    "assignment mail failed, skipping pair"
                );
                continue;
            }

            let assignment = Assignment {
                bead_id: rec.bead_id.clone(),
                bead_title: rec.title.clone(),
                pane_index: agent.pane_index,
                agent_type: agent.family,
                agent_name: agent.name.clone(),
                priority: rec.priority,
                score: pair.score,
                breakdown: pair.breakdown,
                reason: pair.reason.clone(),
                confidence: pair.confidence,
                assigned_at_ms: self.clock.epoch_ms(),
                reserved_files: Vec::new(),
                retry_count: 0,
                previous_pane: None,
                previous_agent: None,
                previous_fail_reason: None,
                status: AssignmentStatus::Assigned,
            };
            if let Err(e) = registry.upsert(assignment.clone()) {
                tracing::warn!(bead = %rec.bead_id, error = %e, "assignment persist failed");
            }

            self.events.emit(CoordEvent::WorkAssigned {
                bead_id: rec.bead_id.clone(),
                agent_name: agent.name.clone(),
                pane_index: agent.pane_index,
                score: pair.score,
            });
            used_recs.push(rec.bead_id.clone());
            placed.push(assignment);
        }

        self.recommendations
            .retain(|r| !used_recs.contains(&r.bead_id));
        placed
    }

    /// Mark a bead's assignment failed in the session registry.
    ///
    /// The registry keeps the reason and bumps the retry count so the
    /// next attempt carries provenance.
    pub fn record_failure(
        &self,
        bead_id: &BeadId,
        reason: &str,
    ) -> Result<Assignment, CoordinatorError> {
        let failed = self.registry().record_failure(bead_id, reason)?;
        tracing::info!(bead = %bead_id, reason, retry = failed.retry_count, "assignment failed");
        Ok(failed)
    }

    /// Move a failed (or still-working) assignment to another agent.
    ///
    /// The previous agent is excluded from the pick; the successor
    /// carries previous pane/agent/fail-reason and the accumulated
    /// retry count, and replaces the predecessor in the registry.
    pub async fn reassign(
        &self,
        bead_id: &BeadId,
        agents: &[AgentCandidate],
    ) -> Result<Assignment, CoordinatorError> {
        let registry = self.registry();
        let mut previous = registry
            .find(bead_id)
            .map_err(AssignmentStoreError::from)?
            .ok_or_else(|| AssignmentStoreError::NotFound(bead_id.clone()))?;
        match previous.status {
            AssignmentStatus::Working => {
                previous
                    .transition(AssignmentStatus::Reassigned)
                    .map_err(AssignmentStoreError::from)?;
            }
            AssignmentStatus::Failed => {}
            from => {
                return Err(AssignmentStoreError::Transition(
                    AssignmentError::InvalidTransition {
                        from,
                        to: AssignmentStatus::Reassigned,
                    },
                )
                .into());
            }
        }

        let eligible: Vec<AgentCandidate> = agents
            .iter()
            .filter(|a| {
                a.state.is_idle()
                    && a.context_pct <= MAX_ASSIGNABLE_CONTEXT_PCT
                    && a.name != previous.agent_name
            })
            .cloned()
            .collect();
        let rec = TriageRecommendation {
            bead_id: previous.bead_id.clone(),
            title: previous.bead_title.clone(),
            bead_type: String::new(),
            priority: previous.priority,
            score: previous.breakdown.base,
            reasons: Vec::new(),
            unblocks: Vec::new(),
            status: String::new(),
            pagerank: 0.0,
            blocker_ratio: 0.0,
            time_to_impact: 0.0,
        };
        let pairs = select_assignments(
            self.config.strategy,
            &eligible,
            std::slice::from_ref(&rec),
            &self.config.score,
        );
        let Some(pair) = pairs.into_iter().next() else {
            return Err(CoordinatorError::NoEligibleAgent(bead_id.clone()));
        };
        let agent = &eligible[pair.agent_index];

        self.mail
            .send_message(assignment_mail(
                &self.config.project,
                &self.config.sender,
                agent,
                &rec,
                &pair,
            ))
            .await?;

        let mut successor = previous.reassigned_to(
            agent.pane_index,
            agent.family,
            &agent.name,
            self.clock.epoch_ms(),
        );
        successor.score = pair.score;
        successor.breakdown = pair.breakdown;
        successor.reason = pair.reason.clone();
        successor.confidence = pair.confidence;
        registry
            .upsert(successor.clone())
            .map_err(AssignmentStoreError::from)?;

        self.events.emit(CoordEvent::WorkAssigned {
            bead_id: successor.bead_id.clone(),
            agent_name: agent.name.clone(),
            pane_index: agent.pane_index,
            score: pair.score,
        });
        tracing::info!(
            bead = %bead_id,
            from = %previous.agent_name,
            to = %agent.name,
            retry = successor.retry_count,
            "assignment moved"
        );
        Ok(successor)
    }

    /// Best pairing for one agent, without mutating the pool.
    pub fn suggest_assignment(&self, agent: &AgentCandidate) -> Option<Suggestion> {
        let pairs = select_assignments(
            self.config.strategy,
            std::slice::from_ref(agent),
            &self.recommendations,
            &self.config.score,
        );
        let best = pairs.into_iter().next()?;
        let rec = &self.recommendations[best.task_index];
        Some(Suggestion {
            bead_id: rec.bead_id.clone(),
            title: rec.title.clone(),
            score: best.score,
            reason: best.reason,
            confidence: best.confidence,
        })
    }
}

fn assignment_mail(
    project: &str,
    sender: &str,
    agent: &AgentCandidate,
    rec: &TriageRecommendation,
    pair: &SelectedPair,
) -> SendMessage {
    let reasons = if rec.reasons.is_empty() {
        pair.reason.clone()
    } else {
        rec.reasons.join("\n- ")
    };
    let body_md = format!(
        "## Assignment: {title}\n\n\
         - Bead: {bead}\n\
         - Priority: P{priority}\n\
         - Score: {score:.2} (confidence {confidence:.2})\n\
         - Impact: unblocks {unblocks} task(s)\n\n\
         ### Why\n- {reasons}\n\n\
         ### Instructions\n\
         Reserve files before editing, work the bead to completion, \
         write a handoff before exiting, and close the bead when done.",
        title = rec.title,
        bead = rec.bead_id,
        priority = rec.priority,
        score = pair.score,
        confidence = pair.confidence,
        unblocks = rec.unblocks.len(),
        reasons = reasons,
    );
    SendMessage {
        project: project.to_string(),
        sender: sender.to_string(),
        to: vec![agent.name.clone()],
        subject: format!("[{}] {}", rec.bead_id, rec.title),
        body_md,
        importance: Importance::Normal,
        ack_required: true,
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
