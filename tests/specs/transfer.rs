// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec: reservation transfer with conflict and rollback.

use muster_adapters::{FakeReservations, ReservationClient};
use muster_reserve::{transfer_reservations, TransferRequest, TransferSpec};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn conflicted_transfer_rolls_back_to_the_holder() {
    let server = FakeReservations::new();
    // Agent A holds internal/a.rs exclusively
    server
        .reserve(
            "proj",
            "A",
            &["internal/a.rs".to_string()],
            900,
            true,
            "edit",
        )
        .await
        .unwrap();
    // The server keeps reporting a conflict through the graced retry
    server.inject_conflict("internal/a.rs", 2);

    let request = TransferRequest {
        grace: Duration::from_millis(5),
        ..TransferRequest::new(
            "proj",
            "A",
            "B",
            vec![TransferSpec {
                path: "internal/a.rs".to_string(),
                exclusive: true,
            }],
        )
    };
    let report = transfer_reservations(&server, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.success);
    assert!(report.rolled_back);
    // B never holds the file; A re-holds it
    assert!(server.paths_of("B").is_empty());
    assert_eq!(server.paths_of("A"), vec!["internal/a.rs"]);
}

#[tokio::test]
async fn successful_transfer_grants_every_requested_path() {
    let server = FakeReservations::new();
    server
        .reserve(
            "proj",
            "A",
            &["src/a.rs".to_string(), "src/b.rs".to_string()],
            900,
            true,
            "edit",
        )
        .await
        .unwrap();

    let request = TransferRequest::new(
        "proj",
        "A",
        "B",
        vec![
            TransferSpec {
                path: "src/a.rs".to_string(),
                exclusive: true,
            },
            TransferSpec {
                path: "src/b.rs".to_string(),
                exclusive: false,
            },
        ],
    );
    let report = transfer_reservations(&server, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.success);
    for path in &report.requested {
        assert!(report.granted.contains(path), "missing grant for {}", path);
    }
    assert_eq!(server.paths_of("B").len(), 2);
}

#[tokio::test]
async fn same_agent_transfer_is_a_renewal() {
    let server = FakeReservations::new();
    server
        .reserve("proj", "A", &["src/a.rs".to_string()], 900, true, "edit")
        .await
        .unwrap();

    let request = TransferRequest::new(
        "proj",
        "A",
        "A",
        vec![TransferSpec {
            path: "src/a.rs".to_string(),
            exclusive: true,
        }],
    );
    let report = transfer_reservations(&server, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.success);
    assert!(report.released.is_empty());
    assert_eq!(server.renew_calls().len(), 1);
}
