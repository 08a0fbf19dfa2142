// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use muster_core::{AgentFamily, ScoreBreakdown};

fn assignment(bead: &str, agent: &str, status: AssignmentStatus) -> Assignment {
    Assignment {
        bead_id: BeadId::new(bead),
        bead_title: format!("work on {}", bead),
        pane_index: 0,
        agent_type: AgentFamily::Claude,
        agent_name: agent.to_string(),
        priority: 2,
        score: 1.0,
        breakdown: ScoreBreakdown::default(),
        reason: String::new(),
        confidence: 0.5,
        assigned_at_ms: 1_000,
        reserved_files: vec![],
        retry_count: 0,
        previous_pane: None,
        previous_agent: None,
        previous_fail_reason: None,
        status,
    }
}

fn with_config_dir<T>(f: impl FnOnce() -> T) -> T {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("MUSTER_CONFIG_DIR", dir.path());
    let out = f();
    std::env::remove_var("MUSTER_CONFIG_DIR");
    out
}

#[test]
#[serial_test::serial]
fn upsert_replaces_by_bead() {
    with_config_dir(|| {
        let registry = AssignmentRegistry::open("dev", "/repo");
        registry
            .upsert(assignment("bd-1", "A", AssignmentStatus::Assigned))
            .unwrap();
        registry
            .upsert(assignment("bd-1", "B", AssignmentStatus::Working))
            .unwrap();
        let listed = registry.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].agent_name, "B");
        assert_eq!(
            registry.find(&BeadId::new("bd-1")).unwrap().unwrap().status,
            AssignmentStatus::Working
        );
    })
}

#[test]
#[serial_test::serial]
fn open_count_skips_terminal() {
    with_config_dir(|| {
        let registry = AssignmentRegistry::open("dev", "/repo");
        registry
            .upsert(assignment("bd-1", "A", AssignmentStatus::Working))
            .unwrap();
        registry
            .upsert(assignment("bd-2", "A", AssignmentStatus::Completed))
            .unwrap();
        registry
            .upsert(assignment("bd-3", "A", AssignmentStatus::Assigned))
            .unwrap();
        assert_eq!(registry.open_count_for("A").unwrap(), 2);
    })
}

#[test]
#[serial_test::serial]
fn prune_drops_terminal_only() {
    with_config_dir(|| {
        let registry = AssignmentRegistry::open("dev", "/repo");
        registry
            .upsert(assignment("bd-1", "A", AssignmentStatus::Completed))
            .unwrap();
        registry
            .upsert(assignment("bd-2", "A", AssignmentStatus::Failed))
            .unwrap();
        assert_eq!(registry.prune_terminal().unwrap(), 1);
        let listed = registry.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].bead_id, BeadId::new("bd-2"));
    })
}

#[test]
#[serial_test::serial]
fn record_failure_persists_the_reason_and_retry() {
    with_config_dir(|| {
        let registry = AssignmentRegistry::open("dev", "/repo");
        registry
            .upsert(assignment("bd-1", "A", AssignmentStatus::Working))
            .unwrap();

        let failed = registry.record_failure(&BeadId::new("bd-1"), "pane went dark").unwrap();
        assert_eq!(failed.status, AssignmentStatus::Failed);
        assert_eq!(failed.retry_count, 1);

        // The transition survived the round trip to disk
        let stored = registry.find(&BeadId::new("bd-1")).unwrap().unwrap();
        assert_eq!(stored.status, AssignmentStatus::Failed);
        assert_eq!(stored.previous_fail_reason.as_deref(), Some("pane went dark"));
    })
}

#[test]
#[serial_test::serial]
fn record_failure_rejects_terminal_assignments() {
    with_config_dir(|| {
        let registry = AssignmentRegistry::open("dev", "/repo");
        registry
            .upsert(assignment("bd-1", "A", AssignmentStatus::Completed))
            .unwrap();
        let err = registry.record_failure(&BeadId::new("bd-1"), "late").unwrap_err();
        assert!(matches!(err, AssignmentStoreError::Transition(_)));

        let err = registry.record_failure(&BeadId::new("bd-9"), "ghost").unwrap_err();
        assert!(matches!(err, AssignmentStoreError::NotFound(_)));
    })
}

#[test]
#[serial_test::serial]
fn transition_walks_the_state_machine_on_disk() {
    with_config_dir(|| {
        let registry = AssignmentRegistry::open("dev", "/repo");
        registry
            .upsert(assignment("bd-1", "A", AssignmentStatus::Assigned))
            .unwrap();
        registry.transition(&BeadId::new("bd-1"), AssignmentStatus::Working).unwrap();
        let stored = registry.find(&BeadId::new("bd-1")).unwrap().unwrap();
        assert_eq!(stored.status, AssignmentStatus::Working);

        let err = registry
            .transition(&BeadId::new("bd-1"), AssignmentStatus::Assigned)
            .unwrap_err();
        assert!(matches!(err, AssignmentStoreError::Transition(_)));
    })
}

#[test]
#[serial_test::serial]
fn mismatched_project_reads_empty() {
    with_config_dir(|| {
        let writer = AssignmentRegistry::open("dev", "/repo");
        writer
            .upsert(assignment("bd-1", "A", AssignmentStatus::Assigned))
            .unwrap();
        let other = AssignmentRegistry::open("dev", "/elsewhere");
        assert!(other.list().unwrap().is_empty());
    })
}
