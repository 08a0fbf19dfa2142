// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use muster_adapters::FakeReservations;

fn spec(path: &str, exclusive: bool) -> TransferSpec {
    TransferSpec {
        path: path.to_string(),
        exclusive,
    }
}

fn request(from: &str, to: &str, specs: Vec<TransferSpec>) -> TransferRequest {
    TransferRequest {
        grace: Duration::from_millis(5),
        ..TransferRequest::new("proj", from, to, specs)
    }
}

async fn seed(server: &FakeReservations, agent: &str, paths: &[(&str, bool)]) {
    for (path, exclusive) in paths {
        use muster_adapters::ReservationClient;
        let outcome = server
            .reserve("proj", agent, &[path.to_string()], 900, *exclusive, "seed")
            .await
            .unwrap();
        assert!(outcome.conflicts.is_empty(), "seed conflicted");
    }
}

#[tokio::test]
async fn clean_transfer_moves_every_path() {
    let server = FakeReservations::new();
    seed(&server, "A", &[("src/a.rs", true), ("docs/x.md", false)]).await;

    let report = transfer_reservations(
        &server,
        &request("A", "B", vec![spec("src/a.rs", true), spec("docs/x.md", false)]),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.success);
    assert!(!report.rolled_back);
    assert_eq!(report.granted.len(), 2);
    // granted ⊇ requested
    for path in &report.requested {
        assert!(report.granted.contains(path));
    }
    assert_eq!(server.paths_of("B"), vec!["docs/x.md", "src/a.rs"]);
    assert!(server.paths_of("A").is_empty());
}

#[tokio::test]
async fn same_agent_transfer_only_renews() {
    let server = FakeReservations::new();
    seed(&server, "A", &[("src/a.rs", true)]).await;

    let report = transfer_reservations(
        &server,
        &request("A", "A", vec![spec("src/a.rs", true)]),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.success);
    assert!(report.released.is_empty());
    assert_eq!(server.renew_calls(), vec![("A".to_string(), 900)]);
    assert_eq!(server.paths_of("A"), vec!["src/a.rs"]);
}

#[tokio::test]
async fn transient_conflict_succeeds_after_grace() {
    let server = FakeReservations::new();
    seed(&server, "A", &[("src/a.rs", true)]).await;
    // First attempt by B loses, the graced retry wins
    server.inject_conflict("src/a.rs", 1);

    let report = transfer_reservations(
        &server,
        &request("A", "B", vec![spec("src/a.rs", true)]),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.success);
    assert_eq!(server.paths_of("B"), vec!["src/a.rs"]);
}

#[tokio::test]
async fn persistent_conflict_rolls_back_to_the_predecessor() {
    let server = FakeReservations::new();
    seed(&server, "A", &[("internal/a.rs", true), ("docs/x.md", false)]).await;
    // Both the first attempt and the graced retry lose
    server.inject_conflict("internal/a.rs", 2);

    let report = transfer_reservations(
        &server,
        &request(
            "A",
            "B",
            vec![spec("internal/a.rs", true), spec("docs/x.md", false)],
        ),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(!report.success);
    assert!(report.rolled_back);
    assert!(report.granted.is_empty());
    assert_eq!(report.conflicts[0].path, "internal/a.rs");
    // B never holds the contested path; A re-holds everything
    assert!(server.paths_of("B").is_empty());
    assert_eq!(server.paths_of("A"), vec!["docs/x.md", "internal/a.rs"]);
}

#[tokio::test]
async fn zero_grace_skips_the_retry() {
    let server = FakeReservations::new();
    seed(&server, "A", &[("src/a.rs", true)]).await;
    // Only the first attempt would fail; without grace there is no retry
    server.inject_conflict("src/a.rs", 1);

    let mut req = request("A", "B", vec![spec("src/a.rs", true)]);
    req.grace = Duration::ZERO;
    let report = transfer_reservations(&server, &req, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.success);
    assert!(report.rolled_back);
    assert_eq!(server.paths_of("A"), vec!["src/a.rs"]);
}

#[tokio::test]
async fn cancellation_during_grace_propagates() {
    let server = FakeReservations::new();
    seed(&server, "A", &[("src/a.rs", true)]).await;
    server.inject_conflict("src/a.rs", 1);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut req = request("A", "B", vec![spec("src/a.rs", true)]);
    req.grace = Duration::from_secs(60);
    let err = transfer_reservations(&server, &req, &cancel).await.unwrap_err();
    assert!(matches!(err, TransferError::Cancelled));
}

#[tokio::test]
async fn invalid_requests_refuse_before_any_call() {
    let cases = [
        ("", "A", "B", "project"),
        ("proj", "", "B", "from_agent"),
        ("proj", "A", "", "to_agent"),
    ];
    for (project, from, to, field) in cases {
        let server = FakeReservations::new();
        let req = TransferRequest::new(project, from, to, vec![spec("src/a.rs", true)]);
        let err = transfer_reservations(&server, &req, &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            TransferError::InvalidRequest { field: f } => assert_eq!(f, field),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(server.renew_calls().is_empty());
    }
}

#[test]
fn exclusive_wins_on_duplicate_paths() {
    let (exclusive, shared) = super::split_reservations(&[
        spec("src/a.rs", false),
        spec("src/a.rs", true),
        spec("docs/x.md", false),
    ]);
    assert_eq!(exclusive, vec!["src/a.rs"]);
    assert_eq!(shared, vec!["docs/x.md"]);
}
