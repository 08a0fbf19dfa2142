// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use muster_adapters::{FakeMux, FakeReservations};
use muster_core::FakeClock;

struct Rig {
    watcher: ReservationWatcher<FakeMux, FakeReservations, FakeClock>,
    mux: FakeMux,
    server: FakeReservations,
    conflicts: mpsc::Receiver<FileConflict>,
    events: mpsc::Receiver<CoordEvent>,
}

fn rig(project_dir: Option<PathBuf>) -> Rig {
    let mux = FakeMux::new();
    let server = FakeReservations::new();
    let (conflict_tx, conflicts) = mpsc::channel(16);
    let (sender, events) = EventSender::channel(16);
    let config = WatcherConfig {
        project: "proj".to_string(),
        project_dir,
        session: "dev".to_string(),
        poll_interval: Duration::from_millis(10),
        ttl_s: 900,
        capture_lines: 50,
    };
    let watcher = ReservationWatcher::new(
        config,
        mux.clone(),
        Some(server.clone()),
        Arc::new(FakeClock::new(42_000)),
        conflict_tx,
        sender,
    );
    Rig {
        watcher,
        mux,
        server,
        conflicts,
        events,
    }
}

#[tokio::test]
async fn poll_reserves_new_paths_for_the_panes_agent() {
    let mut rig = rig(Some(PathBuf::from("/repo")));
    let pane = rig.mux.add_pane("dev", 0, "dev__cc_1");
    rig.watcher.track_pane(pane.clone(), "GreenCastle", AgentFamily::Claude);
    rig.mux.set_scrollback(&pane, "edited src/a.rs\nwrote src/b.rs");

    rig.watcher.poll_once().await;

    assert_eq!(rig.server.paths_of("GreenCastle"), vec!["src/a.rs", "src/b.rs"]);
    assert_eq!(rig.watcher.reserved_paths(&pane), vec!["src/a.rs", "src/b.rs"]);
    assert!(rig.conflicts.try_recv().is_err());
}

#[tokio::test]
async fn already_reserved_paths_are_not_re_reserved() {
    let mut rig = rig(Some(PathBuf::from("/repo")));
    let pane = rig.mux.add_pane("dev", 0, "dev__cc_1");
    rig.watcher.track_pane(pane.clone(), "GreenCastle", AgentFamily::Claude);
    rig.mux.set_scrollback(&pane, "edited src/a.rs");

    rig.watcher.poll_once().await;
    rig.watcher.poll_once().await;

    // A second poll with the same scrollback reserves nothing new; a
    // later conflict injection would have fired otherwise
    rig.server.inject_conflict("src/a.rs", 1);
    rig.watcher.poll_once().await;
    assert!(rig.conflicts.try_recv().is_err());
}

#[tokio::test]
async fn conflicts_are_emitted_not_retried() {
    let mut rig = rig(Some(PathBuf::from("/repo")));
    // Holder reserves first
    use muster_adapters::ReservationClient;
    rig.server
        .reserve("proj", "BlueRiver", &["src/a.rs".to_string()], 900, true, "edit")
        .await
        .unwrap();

    let pane = rig.mux.add_pane("dev", 1, "dev__cc_2");
    rig.watcher.track_pane(pane.clone(), "GreenCastle", AgentFamily::Claude);
    rig.mux.set_scrollback(&pane, "edited src/a.rs");

    rig.watcher.poll_once().await;

    let conflict = rig.conflicts.recv().await.unwrap();
    assert_eq!(conflict.path, "src/a.rs");
    assert_eq!(conflict.requestor_agent, "GreenCastle");
    assert_eq!(conflict.requestor_pane, pane);
    assert_eq!(conflict.session, "dev");
    assert_eq!(conflict.holders, vec!["BlueRiver"]);
    assert_eq!(conflict.detected_at_ms, 42_000);
    assert!(!conflict.holder_ids.is_empty());

    // The mirror event went out on the coordination stream
    match rig.events.recv().await.unwrap() {
        CoordEvent::FileConflict { conflict } => assert_eq!(conflict.path, "src/a.rs"),
        other => panic!("unexpected event {:?}", other),
    }
    // Still held by the original agent
    assert_eq!(rig.server.holders_of("src/a.rs"), vec!["BlueRiver"]);
}

#[tokio::test]
async fn no_project_dir_means_observe_only() {
    let rig = rig(None);
    let pane = rig.mux.add_pane("dev", 0, "dev__cc_1");
    rig.watcher.track_pane(pane.clone(), "GreenCastle", AgentFamily::Claude);
    rig.mux.set_scrollback(&pane, "edited src/a.rs");

    rig.watcher.poll_once().await;
    assert!(rig.server.paths_of("GreenCastle").is_empty());
}

#[tokio::test]
async fn renew_extends_and_emits() {
    let mut rig = rig(Some(PathBuf::from("/repo")));
    let pane = rig.mux.add_pane("dev", 0, "dev__cc_1");
    rig.watcher.track_pane(pane.clone(), "GreenCastle", AgentFamily::Claude);
    rig.mux.set_scrollback(&pane, "edited src/a.rs");
    rig.watcher.poll_once().await;

    rig.watcher.renew_once().await;
    assert_eq!(rig.server.renew_calls(), vec![("GreenCastle".to_string(), 900)]);
    match rig.events.try_recv().unwrap() {
        CoordEvent::ReservationRenewed { agent, count } => {
            assert_eq!(agent, "GreenCastle");
            assert_eq!(count, 1);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn untracked_panes_are_ignored() {
    let rig = rig(Some(PathBuf::from("/repo")));
    let pane = rig.mux.add_pane("dev", 0, "dev__cc_1");
    rig.watcher.track_pane(pane.clone(), "GreenCastle", AgentFamily::Claude);
    rig.watcher.untrack_pane(&pane);
    rig.mux.set_scrollback(&pane, "edited src/a.rs");

    rig.watcher.poll_once().await;
    assert!(rig.server.paths_of("GreenCastle").is_empty());
}
