// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn claude_json_tool_calls() {
    let output = r#"{"tool":"Edit","file_path":"src/watcher.rs","old_string":"x"}"#;
    assert_eq!(
        extract_paths(AgentFamily::Claude, output),
        vec!["src/watcher.rs"]
    );
}

#[test]
fn past_tense_announcements() {
    let output = "I edited src/lib.rs and created tests/specs.rs.";
    assert_eq!(
        extract_paths(AgentFamily::Claude, output),
        vec!["src/lib.rs", "tests/specs.rs"]
    );
}

#[test]
fn progress_colon_lines() {
    let output = "Writing: crates/core/src/agent.rs\nUpdating: Cargo.toml";
    assert_eq!(
        extract_paths(AgentFamily::Codex, output),
        vec!["crates/core/src/agent.rs", "Cargo.toml"]
    );
}

#[test]
fn checkmarked_lists() {
    let output = "✓ edited: src/a.rs\n✓ src/b.rs";
    assert_eq!(
        extract_paths(AgentFamily::Gemini, output),
        vec!["src/a.rs", "src/b.rs"]
    );
}

#[test]
fn generic_tokens_need_a_slash() {
    let output = "compare docs/design.md with design.md baseline";
    // The slashed token comes from the generic layer; the bare one only
    // via a family pattern, which "compare" is not
    assert_eq!(
        extract_paths(AgentFamily::User, output),
        vec!["docs/design.md"]
    );
}

#[test]
fn duplicates_collapse_in_first_seen_order() {
    let output = "edited src/a.rs\nedited src/a.rs\nwrote src/b.rs";
    assert_eq!(
        extract_paths(AgentFamily::Claude, output),
        vec!["src/a.rs", "src/b.rs"]
    );
}

#[yare::parameterized(
    version        = { "edited v1.2.3" },
    bare_version   = { "edited 2.0.1" },
    domain         = { "edited example.com" },
    url_ish        = { "edited registry.npmjs.org" },
    wildcard       = { "edited src/*.rs" },
    angle          = { "edited <stdin>" },
    unknown_ext    = { "edited payload.xyzabc" },
    long_ext       = { "edited file.superlongext" },
)]
fn rejected_candidates(output: &str) {
    assert!(extract_paths(AgentFamily::Claude, output).is_empty());
}

#[yare::parameterized(
    quoted       = { "edited \"src/a.rs\"", "src/a.rs" },
    backticked   = { "edited `src/a.rs`", "src/a.rs" },
    trailing_dot = { "edited src/a.rs.", "src/a.rs" },
    parenthesed  = { "edited (src/a.rs)", "src/a.rs" },
    comma        = { "edited src/a.rs, then built", "src/a.rs" },
)]
fn cleaning(output: &str, expected: &str) {
    assert_eq!(extract_paths(AgentFamily::Claude, output), vec![expected]);
}

#[test]
fn extensionless_files_need_a_directory() {
    assert_eq!(
        extract_paths(AgentFamily::Claude, "edited scripts/deploy"),
        vec!["scripts/deploy"]
    );
    assert!(extract_paths(AgentFamily::Claude, "edited deploy").is_empty());
}
