// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-variable configuration for reservations.

use std::time::Duration;

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Watcher poll interval (`MUSTER_WATCH_POLL_MS`, default 1000).
pub fn watch_poll_interval() -> Duration {
    Duration::from_millis(env_u64("MUSTER_WATCH_POLL_MS", 1_000))
}

/// Reservation TTL in seconds (`MUSTER_RESERVATION_TTL_S`, default 900).
pub fn reservation_ttl_s() -> u64 {
    env_u64("MUSTER_RESERVATION_TTL_S", 900)
}
