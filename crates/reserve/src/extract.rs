// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-path extraction from agent output.
//!
//! Each family announces edits differently: structured JSON tool calls,
//! past-tense summaries, `Writing:` progress lines, check-marked lists.
//! Candidates are cleaned and validated before anything is reserved.

use muster_core::AgentFamily;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("constant pattern is valid")
}

static JSON_FILE_PATH: LazyLock<Regex> =
    LazyLock::new(|| re(r#""file_path"\s*:\s*"([^"]+)""#));
static PAST_TENSE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:edited|modified|created|wrote)\s+(\S+)"));
static PROGRESS_COLON: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:writing|editing|creating|created|updating)\s*:\s*(\S+)"));
static CHECKMARK: LazyLock<Regex> =
    LazyLock::new(|| re(r"[✓✔]\s*(?:edited|created|wrote|modified)?\s*:?\s*(\S+)"));

/// Extensions worth reserving. Anything longer than 8 characters after
/// the final dot is treated as not-a-file.
const EXTENSIONS: &[&str] = &[
    "rs", "go", "py", "js", "ts", "tsx", "jsx", "mjs", "cjs", "md", "toml", "yaml", "yml", "json",
    "sh", "bash", "c", "h", "cc", "cpp", "hpp", "rb", "java", "kt", "swift", "sql", "css", "scss",
    "html", "vue", "svelte", "proto", "tf", "lock", "txt", "cfg", "ini", "env", "xml", "gradle",
    "makefile", "dockerfile",
];

const DOMAIN_SUFFIXES: &[&str] = &["com", "org", "net", "io", "dev", "ai", "co"];

/// Clean a raw candidate: strip quoting and trailing punctuation.
fn clean(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| "\"'`“”".contains(c))
        .trim_end_matches(|c: char| ",.;:)]}".contains(c))
        .trim_start_matches(|c: char| "([{".contains(c))
}

/// A version string like `v1.2.3` or `2.0.1`.
fn looks_like_version(s: &str) -> bool {
    let stripped = s.strip_prefix('v').unwrap_or(s);
    !stripped.is_empty()
        && stripped.split('.').count() >= 2
        && stripped.split('.').all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// A bare domain like `example.com` (no path separator).
fn looks_like_domain(s: &str) -> bool {
    if s.contains('/') {
        return false;
    }
    match s.rsplit_once('.') {
        Some((_, suffix)) => DOMAIN_SUFFIXES.contains(&suffix.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Validate a cleaned candidate as a reservable file path.
fn is_valid_path(s: &str) -> bool {
    if s.is_empty() || s.len() > 512 {
        return false;
    }
    if s.chars().any(|c| c.is_whitespace() || "<>|*?".contains(c)) {
        return false;
    }
    if looks_like_version(s) || looks_like_domain(s) {
        return false;
    }
    let name = s.rsplit('/').next().unwrap_or(s);
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && ext.len() <= 8
                && EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        // Extensionless names only count when under a directory
        None => s.contains('/') && !name.is_empty(),
    }
}

fn patterns_for(family: AgentFamily) -> Vec<&'static Regex> {
    match family {
        AgentFamily::Claude => vec![&JSON_FILE_PATH, &PAST_TENSE, &CHECKMARK],
        AgentFamily::Codex => vec![&PROGRESS_COLON, &PAST_TENSE],
        AgentFamily::Gemini => vec![&PROGRESS_COLON, &CHECKMARK, &PAST_TENSE],
        AgentFamily::Aider => vec![&PAST_TENSE, &CHECKMARK],
        AgentFamily::Cursor | AgentFamily::Windsurf => vec![&PROGRESS_COLON, &PAST_TENSE],
        AgentFamily::User => vec![&PAST_TENSE],
    }
}

/// Extract edited file paths from one scrollback capture, deduplicated
/// in first-seen order.
pub fn extract_paths(family: AgentFamily, output: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |candidate: &str| {
        let cleaned = clean(candidate);
        if is_valid_path(cleaned) && !found.iter().any(|f| f == cleaned) {
            found.push(cleaned.to_string());
        }
    };

    for regex in patterns_for(family) {
        for captures in regex.captures_iter(output) {
            if let Some(m) = captures.get(1) {
                push(m.as_str());
            }
        }
    }

    // Generic path tokens as the fallback layer for every family
    for line in output.lines() {
        for token in line.split_whitespace() {
            let cleaned = clean(token);
            if cleaned.contains('/') {
                push(cleaned);
            }
        }
    }
    found
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
