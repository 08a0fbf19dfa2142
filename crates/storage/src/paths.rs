// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry path derivation and key sanitization.

use std::path::PathBuf;

/// Root directory for registries.
///
/// `MUSTER_CONFIG_DIR` overrides the OS user-config location (tests point
/// this at a tempdir).
pub fn config_root() -> PathBuf {
    if let Ok(dir) = std::env::var("MUSTER_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("muster")
}

/// Map an arbitrary key into a filesystem-safe `[a-z0-9_]+` segment.
///
/// Keys already in that alphabet pass through; anything else becomes
/// `hex_<hex-of-bytes>` so distinct inputs stay distinct.
pub fn sanitize_key(input: &str) -> String {
    if !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return input.to_string();
    }
    let mut out = String::with_capacity(4 + input.len() * 2);
    out.push_str("hex_");
    for b in input.as_bytes() {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Normalize a project key so path comparisons tolerate trailing
/// separators (`/repo/` and `/repo` are the same project).
pub fn normalize_project_key(key: &str) -> String {
    let trimmed = key.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        key.to_string()
    } else {
        trimmed.to_string()
    }
}

/// True when two project keys refer to the same project.
pub fn project_keys_match(a: &str, b: &str) -> bool {
    normalize_project_key(a) == normalize_project_key(b)
}
