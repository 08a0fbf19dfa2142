// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec: pane state detection across families.

use muster_core::{AgentFamily, AgentState, ErrorKind};
use muster_detect::{classify, DetectorConfig, PatternTable};

fn detect(scrollback: &str, family: Option<AgentFamily>, age_ms: u64) -> AgentState {
    classify(
        scrollback,
        family,
        age_ms,
        &DetectorConfig::default(),
        &PatternTable::new(),
    )
}

#[test]
fn claude_prompt_is_idle_for_claude_and_user_panes() {
    let scrollback = "Task done\nclaude>";
    assert_eq!(
        detect(scrollback, Some(AgentFamily::Claude), 10_000),
        AgentState::Idle
    );
    // A user pane gets the trailing-> fallback instead
    assert_eq!(
        detect(scrollback, Some(AgentFamily::User), 10_000),
        AgentState::Idle
    );
}

#[test]
fn rate_limit_error_beats_everything_regardless_of_family() {
    let scrollback = "Error: rate limit exceeded";
    for family in [
        Some(AgentFamily::Claude),
        Some(AgentFamily::Codex),
        Some(AgentFamily::User),
        None,
    ] {
        assert_eq!(
            detect(scrollback, family, 0),
            AgentState::Error(ErrorKind::RateLimit)
        );
    }
}

#[test]
fn detection_matches_on_ansi_colored_scrollback() {
    let plain = "building\nclaude>";
    let colored = "\u{1b}[1m\u{1b}[33mbuilding\u{1b}[0m\n\u{1b}[32mclaude>\u{1b}[0m";
    assert_eq!(
        detect(plain, Some(AgentFamily::Claude), 10_000),
        detect(colored, Some(AgentFamily::Claude), 10_000)
    );
}

#[test]
fn exited_agent_is_never_idle() {
    // Bare shell prompt on an agent pane means the CLI exited
    let scrollback = "goodbye\n$";
    let state = detect(scrollback, Some(AgentFamily::Claude), 60_000);
    assert_ne!(state, AgentState::Idle);
}

#[test]
fn fresh_activity_reads_as_working() {
    assert_eq!(
        detect("compiling 42/97", Some(AgentFamily::Codex), 1_000),
        AgentState::Working
    );
    assert_eq!(
        detect("compiling 42/97", Some(AgentFamily::Codex), 30_000),
        AgentState::Idle
    );
}
