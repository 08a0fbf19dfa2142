// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::AgentFamily;

fn assignment() -> Assignment {
    Assignment {
        bead_id: BeadId::new("bd-42"),
        bead_title: "Fix flaky watcher test".to_string(),
        pane_index: 1,
        agent_type: AgentFamily::Claude,
        agent_name: "GreenCastle".to_string(),
        priority: 1,
        score: 0.8,
        breakdown: ScoreBreakdown {
            base: 0.8,
            ..Default::default()
        },
        reason: String::new(),
        confidence: 0.4,
        assigned_at_ms: 1_000,
        reserved_files: vec![],
        retry_count: 0,
        previous_pane: None,
        previous_agent: None,
        previous_fail_reason: None,
        status: AssignmentStatus::Assigned,
    }
}

#[yare::parameterized(
    assigned_to_working      = { AssignmentStatus::Assigned, AssignmentStatus::Working, true },
    assigned_to_failed       = { AssignmentStatus::Assigned, AssignmentStatus::Failed, true },
    assigned_to_completed    = { AssignmentStatus::Assigned, AssignmentStatus::Completed, false },
    working_to_completed     = { AssignmentStatus::Working, AssignmentStatus::Completed, true },
    working_to_failed        = { AssignmentStatus::Working, AssignmentStatus::Failed, true },
    working_to_reassigned    = { AssignmentStatus::Working, AssignmentStatus::Reassigned, true },
    failed_to_assigned       = { AssignmentStatus::Failed, AssignmentStatus::Assigned, true },
    failed_to_working        = { AssignmentStatus::Failed, AssignmentStatus::Working, false },
    completed_is_terminal    = { AssignmentStatus::Completed, AssignmentStatus::Assigned, false },
    reassigned_is_terminal   = { AssignmentStatus::Reassigned, AssignmentStatus::Assigned, false },
)]
fn transitions(from: AssignmentStatus, to: AssignmentStatus, ok: bool) {
    assert_eq!(from.can_transition(to), ok);
}

#[test]
fn invalid_transition_is_rejected_and_state_kept() {
    let mut a = assignment();
    let err = a.transition(AssignmentStatus::Completed).unwrap_err();
    assert!(matches!(err, AssignmentError::InvalidTransition { .. }));
    assert_eq!(a.status, AssignmentStatus::Assigned);
}

#[test]
fn fail_records_reason_and_bumps_retry() {
    let mut a = assignment();
    a.transition(AssignmentStatus::Working).unwrap();
    a.fail("pane went dark").unwrap();
    assert_eq!(a.status, AssignmentStatus::Failed);
    assert_eq!(a.previous_fail_reason.as_deref(), Some("pane went dark"));
    assert_eq!(a.retry_count, 1);
}

#[test]
fn reassignment_carries_provenance() {
    let mut a = assignment();
    a.transition(AssignmentStatus::Working).unwrap();
    a.fail("rate limited").unwrap();
    a.transition(AssignmentStatus::Assigned).unwrap();
    a.transition(AssignmentStatus::Working).unwrap();
    a.transition(AssignmentStatus::Reassigned).unwrap();

    let next = a.reassigned_to(3, AgentFamily::Codex, "BlueRiver", 2_000);
    assert_eq!(next.status, AssignmentStatus::Assigned);
    assert_eq!(next.retry_count, 1);
    assert_eq!(next.previous_pane, Some(1));
    assert_eq!(next.previous_agent.as_deref(), Some("GreenCastle"));
    assert_eq!(next.previous_fail_reason.as_deref(), Some("rate limited"));
    assert_eq!(next.bead_id, a.bead_id);
    assert!(next.reserved_files.is_empty());
}

#[test]
fn direct_reassignment_keeps_the_retry_count() {
    let mut a = assignment();
    a.transition(AssignmentStatus::Working).unwrap();
    a.transition(AssignmentStatus::Reassigned).unwrap();
    // No failure happened, so the successor is not a retry
    let next = a.reassigned_to(2, AgentFamily::Gemini, "TealHeron", 2_000);
    assert_eq!(next.retry_count, 0);
    assert_eq!(next.previous_agent.as_deref(), Some("GreenCastle"));
    assert_eq!(next.previous_fail_reason, None);
}

#[test]
fn breakdown_total_is_additive() {
    let b = ScoreBreakdown {
        base: 1.0,
        agent_type_bonus: 0.15,
        critical_path_bonus: 0.1,
        profile_tag_bonus: 0.05,
        focus_pattern_bonus: 0.1,
        file_overlap_penalty: 0.2,
        context_penalty: 0.05,
    };
    assert!((b.total() - 1.15).abs() < 1e-9);
}

#[test]
fn salient_terms_skip_noise() {
    let b = ScoreBreakdown {
        base: 1.0,
        agent_type_bonus: 0.01,
        ..Default::default()
    };
    assert!(b.salient_terms().is_empty());
}
