// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-variable configuration for the adapters.

use std::time::Duration;

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Binary used to talk to the terminal multiplexer (`MUSTER_TMUX_BIN`).
pub fn tmux_bin() -> String {
    std::env::var("MUSTER_TMUX_BIN").unwrap_or_else(|_| "tmux".to_string())
}

/// Scrollback lines captured per pane (`MUSTER_CAPTURE_LINES`, default 50).
pub fn capture_lines() -> u32 {
    env_u64("MUSTER_CAPTURE_LINES", 50) as u32
}

/// Timeout for one multiplexer subprocess call
/// (`MUSTER_MUX_TIMEOUT_MS`, default 5000).
pub fn mux_timeout() -> Duration {
    Duration::from_millis(env_u64("MUSTER_MUX_TIMEOUT_MS", 5_000))
}
