// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use muster_core::{AgentFamily, ErrorKind};

fn table() -> PatternTable {
    PatternTable::new()
}

#[yare::parameterized(
    http_429        = { "HTTP 429 returned", ErrorKind::RateLimit },
    rate_limit      = { "Error: rate limit exceeded", ErrorKind::RateLimit },
    too_many        = { "too many requests, backing off", ErrorKind::RateLimit },
    panic           = { "thread 'main' panicked at src/lib.rs:10", ErrorKind::Crash },
    segfault        = { "Segmentation fault (core dumped)", ErrorKind::Crash },
    aborted         = { "Aborted (signal 6)", ErrorKind::Crash },
    auth_401        = { "server said 401", ErrorKind::Auth },
    unauthorized    = { "Unauthorized: check credentials", ErrorKind::Auth },
    bad_key         = { "invalid API key provided", ErrorKind::Auth },
    refused         = { "connect ECONNREFUSED 127.0.0.1:8080", ErrorKind::Connection },
    unreachable     = { "network is unreachable", ErrorKind::Connection },
    timeout         = { "request timed out after 30s", ErrorKind::Connection },
    error_prefix    = { "error: cannot find module", ErrorKind::Generic },
    failed          = { "build failed with 3 errors", ErrorKind::Generic },
    traceback       = { "Traceback (most recent call last)", ErrorKind::Generic },
)]
fn error_kinds(line: &str, expected: ErrorKind) {
    assert_eq!(table().match_error(line), Some(expected));
}

#[test]
fn clean_line_matches_nothing() {
    assert_eq!(table().match_error("all tests passed"), None);
}

#[test]
fn rate_limit_wins_over_generic_on_same_line() {
    // The line contains both "Error:" and "rate limit"
    assert_eq!(
        table().match_error("Error: rate limit exceeded"),
        Some(ErrorKind::RateLimit)
    );
}

#[test]
fn custom_error_pattern_is_appended_at_runtime() {
    let table = table();
    assert_eq!(table.match_error("quota exhausted"), None);
    table
        .add_error_pattern(ErrorKind::RateLimit, r"(?i)quota exhausted")
        .unwrap();
    assert_eq!(
        table.match_error("quota exhausted"),
        Some(ErrorKind::RateLimit)
    );
}

#[test]
fn bad_custom_pattern_is_rejected() {
    assert!(table()
        .add_error_pattern(ErrorKind::Generic, "([unclosed")
        .is_err());
}

#[yare::parameterized(
    claude_own      = { "claude>", Some(AgentFamily::Claude), Some(PromptHit::Agent) },
    claude_foreign  = { "claude>", Some(AgentFamily::Codex), None },
    codex_own       = { "codex> ", Some(AgentFamily::Codex), Some(PromptHit::Agent) },
    gemini_own      = { "gemini>", Some(AgentFamily::Gemini), Some(PromptHit::Agent) },
    numbered        = { "42 >", Some(AgentFamily::Claude), Some(PromptHit::Agent) },
    border          = { "│ >", Some(AgentFamily::Gemini), Some(PromptHit::Agent) },
    border_ascii    = { "| >", Some(AgentFamily::Claude), Some(PromptHit::Agent) },
    shell_on_agent  = { "$", Some(AgentFamily::Claude), Some(PromptHit::Shell) },
    pct_on_agent    = { "% ", Some(AgentFamily::Codex), Some(PromptHit::Shell) },
    shell_on_user   = { "$", Some(AgentFamily::User), Some(PromptHit::Agent) },
    shell_no_family = { "$", None, Some(PromptHit::Agent) },
    gt_on_agent     = { "some output >", Some(AgentFamily::Claude), None },
    gt_on_user      = { "claude>", Some(AgentFamily::User), Some(PromptHit::Agent) },
    gt_no_family    = { "anything >", None, Some(PromptHit::Agent) },
    not_a_prompt    = { "building crate...", Some(AgentFamily::Claude), None },
)]
fn prompt_classification(line: &str, family: Option<AgentFamily>, expected: Option<PromptHit>) {
    assert_eq!(table().match_prompt(line, family), expected);
}

#[test]
fn custom_prompt_pattern_is_family_scoped() {
    let table = table();
    table
        .add_prompt_pattern(AgentFamily::Aider, r"^ready\.$")
        .unwrap();
    assert_eq!(
        table.match_prompt("ready.", Some(AgentFamily::Aider)),
        Some(PromptHit::Agent)
    );
    assert_eq!(table.match_prompt("ready.", Some(AgentFamily::Claude)), None);
}
