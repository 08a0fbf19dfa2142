// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec: handoff write, read-back, goal/now cache, and recovery budget.

use muster_core::{DoneItem, FakeClock, Handoff};
use muster_handoff::{format_handoff_context, HandoffStore, HandoffWriter, SessionKind};

#[test]
fn handoff_round_trips_bit_for_bit() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new(1_772_368_245_000);

    let mut handoff = Handoff::new("Implement feature", "Write tests");
    handoff.status = "complete".to_string();
    handoff.outcome = "SUCCEEDED".to_string();
    handoff.agent_type = "cc".to_string();
    handoff.done_this_session = vec![DoneItem {
        task: "Created handler".to_string(),
        files: vec!["handler.rs".to_string()],
    }];

    let writer = HandoffWriter::new(dir.path());
    writer.write(handoff.clone(), "dev", false, &clock).unwrap();

    let store = HandoffStore::new(dir.path());
    let (_, read) = store.find_latest("dev").unwrap().unwrap();
    assert_eq!(read.goal, handoff.goal);
    assert_eq!(read.now, handoff.now);
    assert_eq!(read.status, "complete");
    assert_eq!(read.outcome, "SUCCEEDED");
    assert_eq!(read.agent_type, "cc");
    assert_eq!(read.done_this_session, handoff.done_this_session);
}

#[test]
fn goal_now_cache_sees_file_rewrites() {
    let dir = tempfile::tempdir().unwrap();
    let session_dir = dir.path().join(".ntm/handoffs/dev");
    std::fs::create_dir_all(&session_dir).unwrap();
    let path = session_dir.join("handoff-20260301-090000.yaml");
    std::fs::write(&path, "goal: \"Cached goal\"\nnow: start\n").unwrap();

    let store = HandoffStore::new(dir.path());
    // Miss then hit
    assert_eq!(
        store.extract_goal_now("dev").unwrap().unwrap().0,
        "Cached goal"
    );
    assert_eq!(
        store.extract_goal_now("dev").unwrap().unwrap().0,
        "Cached goal"
    );

    // Rewrite; the changed mod time invalidates the entry
    std::thread::sleep(std::time::Duration::from_millis(20));
    std::fs::write(&path, "goal: New goal\nnow: continue\n").unwrap();
    assert_eq!(store.extract_goal_now("dev").unwrap().unwrap().0, "New goal");
}

#[test]
fn recovery_injection_respects_the_token_budget() {
    let mut handoff = Handoff::new("g".repeat(5_000), "n".repeat(5_000));
    handoff.next = (0..10).map(|i| format!("step {} {}", i, "x".repeat(800))).collect();
    handoff.blockers = vec!["b".repeat(3_000)];

    let out = format_handoff_context(&handoff, SessionKind::FreshSpawn);
    // 500 tokens at 4 bytes/token, with 20% slack
    assert!(out.len() / 4 <= 600);
    assert!(out.starts_with("## Previous Session Context"));
}
