// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

fn write_handoff(root: &Path, session: &str, name: &str, body: &str) -> PathBuf {
    let dir = root.join(HANDOFF_DIR).join(session);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn missing_directory_is_none_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = HandoffStore::new(dir.path());
    assert!(store.find_latest("dev").unwrap().is_none());
    assert!(store.extract_goal_now("dev").unwrap().is_none());
    assert!(store.list_sessions().unwrap().is_empty());
}

#[test]
fn find_latest_takes_the_lexicographic_maximum() {
    let dir = tempfile::tempdir().unwrap();
    write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-090000.yaml",
        "goal: early\nnow: a\n",
    );
    write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-110000.yaml",
        "goal: late\nnow: b\n",
    );
    // auto- prefix sorts before handoff-, the timestamp still governs
    write_handoff(
        dir.path(),
        "dev",
        "auto-handoff-20260301-120000.yaml",
        "goal: auto\nnow: c\n",
    );

    let store = HandoffStore::new(dir.path());
    let (_, handoff) = store.find_latest("dev").unwrap().unwrap();
    assert_eq!(handoff.goal, "late");
}

#[test]
fn read_is_lenient_about_validation_issues() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-090000.yaml",
        "goal: g\nnow: n\nstatus: bogus\ndate: notadate\n",
    );
    let store = HandoffStore::new(dir.path());
    let handoff = store.read(&path).unwrap();
    assert_eq!(handoff.status, "bogus");
    assert_eq!(handoff.goal, "g");
}

#[test]
fn unparseable_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_handoff(dir.path(), "dev", "handoff-x.yaml", ": [ not yaml");
    let store = HandoffStore::new(dir.path());
    assert!(matches!(
        store.read(&path),
        Err(StoreError::Parse { .. })
    ));
}

#[test]
fn find_latest_any_compares_created_at() {
    let dir = tempfile::tempdir().unwrap();
    write_handoff(
        dir.path(),
        "alpha",
        "handoff-20260301-090000.yaml",
        "goal: alpha\nnow: a\ncreated_at: 1000\n",
    );
    write_handoff(
        dir.path(),
        "beta",
        "handoff-20260228-000000.yaml",
        "goal: beta\nnow: b\ncreated_at: 2000\n",
    );

    let store = HandoffStore::new(dir.path());
    let (_, handoff) = store.find_latest_any().unwrap().unwrap();
    assert_eq!(handoff.goal, "beta");
}

#[test]
fn extract_goal_now_hits_cache_and_sees_rewrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-090000.yaml",
        "goal: \"Cached goal\"\nnow: first task\n",
    );
    let store = HandoffStore::new(dir.path());

    // Miss, then hit
    let (goal, now) = store.extract_goal_now("dev").unwrap().unwrap();
    assert_eq!(goal, "Cached goal");
    assert_eq!(now, "first task");
    let (goal, _) = store.extract_goal_now("dev").unwrap().unwrap();
    assert_eq!(goal, "Cached goal");

    // Rewrite moves the mod time; the third call sees the new goal
    std::thread::sleep(std::time::Duration::from_millis(20));
    fs::write(&path, "goal: Fresh goal\nnow: second task\n").unwrap();
    let (goal, now) = store.extract_goal_now("dev").unwrap().unwrap();
    assert_eq!(goal, "Fresh goal");
    assert_eq!(now, "second task");
}

#[test]
fn invalidate_cache_forces_a_reread() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-090000.yaml",
        "goal: one\nnow: n\n",
    );
    let store = HandoffStore::new(dir.path());
    store.extract_goal_now("dev").unwrap();
    store.invalidate_cache(Some(&path));
    let (goal, _) = store.extract_goal_now("dev").unwrap().unwrap();
    assert_eq!(goal, "one");
}

#[test]
fn list_handoffs_sorts_by_mod_time_desc() {
    let dir = tempfile::tempdir().unwrap();
    write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-090000.yaml",
        "goal: older\nnow: a\nstatus: complete\n",
    );
    std::thread::sleep(std::time::Duration::from_millis(20));
    write_handoff(
        dir.path(),
        "dev",
        "handoff-20260301-100000.yaml",
        "goal: newer\nnow: b\nstatus: partial\n",
    );

    let store = HandoffStore::new(dir.path());
    let listed = store.list_handoffs("dev").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].goal, "newer");
    assert_eq!(listed[0].status, "partial");
    assert_eq!(listed[1].goal, "older");
}

#[test]
fn list_sessions_skips_dot_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_handoff(dir.path(), "beta", "h.yaml", "goal: g\nnow: n\n");
    write_handoff(dir.path(), "alpha", "h.yaml", "goal: g\nnow: n\n");
    write_handoff(dir.path(), ".archive", "h.yaml", "goal: g\nnow: n\n");

    let store = HandoffStore::new(dir.path());
    assert_eq!(store.list_sessions().unwrap(), vec!["alpha", "beta"]);
}

#[test]
fn non_yaml_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write_handoff(dir.path(), "dev", "notes.txt", "goal: fake\n");
    write_handoff(dir.path(), "dev", "handoff-a.yaml", "goal: real\nnow: n\n");
    let store = HandoffStore::new(dir.path());
    let (_, handoff) = store.find_latest("dev").unwrap().unwrap();
    assert_eq!(handoff.goal, "real");
}
