// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery formatting.
//!
//! Builds the prompt injection that rehydrates a successor agent from a
//! handoff, under a hard budget of 500 tokens at 4 bytes per token.
//! Sections are added in fixed order, each deducting its actual byte
//! length; a section is skipped once the remainder falls under its gate.

use muster_core::Handoff;

/// Hard budget for the full context injection, tokens.
pub const CONTEXT_BUDGET_TOKENS: usize = 500;

/// Byte-denominated token heuristic.
pub const BYTES_PER_TOKEN: usize = 4;

/// What kind of session the injection seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionKind {
    /// A brand-new agent pane
    #[default]
    FreshSpawn,
    /// Same agent after `/clear`
    AfterClear,
    /// Same agent after a context compaction
    AfterCompact,
}

/// Truncate to at most `max_tokens` worth of bytes, on a char boundary,
/// appending `…` when something was cut.
pub fn truncate_tokens(s: &str, max_tokens: usize) -> String {
    let max_bytes = max_tokens * BYTES_PER_TOKEN;
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

struct BudgetWriter {
    out: String,
    remaining: usize,
}

impl BudgetWriter {
    fn new(budget_bytes: usize) -> Self {
        Self {
            out: String::new(),
            remaining: budget_bytes,
        }
    }

    /// Append `section` unless the remainder is below `gate` or the
    /// section itself no longer fits.
    fn push(&mut self, section: &str, gate: usize) -> bool {
        if self.remaining < gate || section.len() > self.remaining {
            return false;
        }
        self.out.push_str(section);
        self.remaining -= section.len();
        true
    }
}

/// `Last: … | Now: …`, both fields truncated to 60 tokens.
pub fn format_minimal_handoff(handoff: &Handoff) -> String {
    format!(
        "Last: {} | Now: {}",
        truncate_tokens(&handoff.goal, 60),
        truncate_tokens(&handoff.now, 60),
    )
}

/// Full context injection for a successor agent.
pub fn format_handoff_context(handoff: &Handoff, kind: SessionKind) -> String {
    if kind == SessionKind::AfterCompact {
        return format_minimal_handoff(handoff);
    }

    let mut w = BudgetWriter::new(CONTEXT_BUDGET_TOKENS * BYTES_PER_TOKEN);
    w.push("## Previous Session Context\n", 0);
    w.push(
        &format!(
            "**Your immediate task:** {}\n",
            truncate_tokens(&handoff.now, 80)
        ),
        40,
    );
    w.push(
        &format!(
            "**Last session achieved:** {}\n",
            truncate_tokens(&handoff.goal, 80)
        ),
        40,
    );

    if !handoff.next.is_empty() && w.push("**Next steps:**\n", 60) {
        for step in handoff.next.iter().take(3) {
            w.push(&format!("- {}\n", truncate_tokens(step, 60)), 30);
        }
    }
    if !handoff.decisions.is_empty() && w.push("**Key decisions:**\n", 60) {
        for (key, value) in handoff.decisions.iter().take(3) {
            w.push(
                &format!("- {}: {}\n", key, truncate_tokens(value, 40)),
                30,
            );
        }
    }
    if !handoff.findings.is_empty() && w.push("**Findings:**\n", 50) {
        for (key, value) in handoff.findings.iter().take(2) {
            w.push(
                &format!("- {}: {}\n", key, truncate_tokens(value, 40)),
                30,
            );
        }
    }
    if !handoff.blockers.is_empty() && w.push("**Blockers:**\n", 50) {
        for blocker in handoff.blockers.iter().take(2) {
            w.push(&format!("- {}\n", truncate_tokens(blocker, 50)), 30);
        }
    }
    if kind == SessionKind::AfterClear
        && !handoff.cm_memories.is_empty()
        && w.push("**Relevant memories:**\n", 60)
    {
        for memory in handoff.cm_memories.iter().take(3) {
            w.push(&format!("- {}\n", truncate_tokens(memory, 60)), 30);
        }
    }
    w.out
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
