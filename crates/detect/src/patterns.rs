// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt and error pattern tables.
//!
//! Plain data keyed by agent family; the process-wide table is guarded by
//! a reader/writer lock and can take custom patterns at runtime. Detection
//! takes the read side.

use muster_core::{AgentFamily, ErrorKind};
use parking_lot::RwLock;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// How a prompt line was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptHit {
    /// An agent is sitting at its prompt
    Agent,
    /// A bare shell prompt; for a known-agent pane this means the agent
    /// process exited
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    /// Family-specific prompt, e.g. `claude>`
    Agent,
    /// `123 >` numbered variant
    Numbered,
    /// `│ >` border-framed variant
    Border,
    /// Pure `$` / `%` shell prompt
    Shell,
    /// Trailing-`>` fallback, only for panes with no agent family
    GenericGt,
}

struct PromptPattern {
    family: Option<AgentFamily>,
    kind: PromptKind,
    regex: Regex,
}

struct ErrorPattern {
    kind: ErrorKind,
    regex: Regex,
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

#[derive(Default)]
struct Tables {
    prompts: Vec<PromptPattern>,
    errors: Vec<ErrorPattern>,
}

/// Shared prompt/error pattern table.
pub struct PatternTable {
    tables: RwLock<Tables>,
}

#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("constant pattern is valid")
}

fn default_prompts() -> Vec<PromptPattern> {
    use AgentFamily::*;
    let agent = |family, pattern: &str| PromptPattern {
        family: Some(family),
        kind: PromptKind::Agent,
        regex: re(pattern),
    };
    let anon = |kind, pattern: &str| PromptPattern {
        family: None,
        kind,
        regex: re(pattern),
    };
    vec![
        agent(Claude, r"^claude>\s*$"),
        agent(Codex, r"^codex>\s*$"),
        agent(Gemini, r"^gemini>\s*$"),
        agent(Cursor, r"^cursor>\s*$"),
        agent(Windsurf, r"^windsurf>\s*$"),
        agent(Aider, r"^aider[>:]\s*$"),
        anon(PromptKind::Numbered, r"^\d+ >\s*$"),
        anon(PromptKind::Border, r"^[│|]\s*>\s*$"),
        anon(PromptKind::Shell, r"^[$%]\s*$"),
        anon(PromptKind::GenericGt, r">\s*$"),
    ]
}

fn default_errors() -> Vec<ErrorPattern> {
    let p = |kind, pattern: &str| ErrorPattern {
        kind,
        regex: re(pattern),
    };
    // Order is the match precedence within one line
    vec![
        p(ErrorKind::RateLimit, r"(?i)\b429\b"),
        p(ErrorKind::RateLimit, r"(?i)rate limit"),
        p(ErrorKind::RateLimit, r"(?i)too many requests"),
        p(ErrorKind::Crash, r"(?i)\bpanic(ked)?\b"),
        p(ErrorKind::Crash, r"(?i)segmentation fault|segfault"),
        p(ErrorKind::Crash, r"(?i)\baborted\b"),
        p(ErrorKind::Crash, r"(?i)process exited with|core dumped|killed: 9"),
        p(ErrorKind::Auth, r"(?i)\b401\b"),
        p(ErrorKind::Auth, r"(?i)unauthorized"),
        p(ErrorKind::Auth, r"(?i)invalid api key"),
        p(ErrorKind::Connection, r"(?i)ECONNREFUSED"),
        p(ErrorKind::Connection, r"(?i)network (is )?unreachable"),
        p(ErrorKind::Connection, r"(?i)\btimed?\s?out\b"),
        p(ErrorKind::Generic, r"(?i)^\s*error:"),
        p(ErrorKind::Generic, r"(?i)\bfailed\b"),
        p(ErrorKind::Generic, r"^Traceback \(most recent call last\)"),
        p(ErrorKind::Generic, r"(?i)^\s*stack trace:"),
    ]
}

static GLOBAL: LazyLock<PatternTable> = LazyLock::new(PatternTable::new);

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTable {
    /// A table with the built-in defaults.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                prompts: default_prompts(),
                errors: default_errors(),
            }),
        }
    }

    /// The process-wide table. Inject a local table where testability
    /// matters; the global exists for the common single-fleet case.
    pub fn global() -> &'static PatternTable {
        &GLOBAL
    }

    /// Append a custom error pattern (checked last within its line scan).
    pub fn add_error_pattern(&self, kind: ErrorKind, pattern: &str) -> Result<(), PatternError> {
        let regex = Regex::new(pattern)?;
        tracing::debug!(?kind, pattern, "custom error pattern added");
        self.tables.write().errors.push(ErrorPattern { kind, regex });
        Ok(())
    }

    /// Append a custom agent prompt pattern for one family.
    pub fn add_prompt_pattern(
        &self,
        family: AgentFamily,
        pattern: &str,
    ) -> Result<(), PatternError> {
        let regex = Regex::new(pattern)?;
        self.tables.write().prompts.push(PromptPattern {
            family: Some(family),
            kind: PromptKind::Agent,
            regex,
        });
        Ok(())
    }

    /// First error kind matching `line`, in precedence order.
    pub fn match_error(&self, line: &str) -> Option<ErrorKind> {
        let tables = self.tables.read();
        tables
            .errors
            .iter()
            .find(|p| p.regex.is_match(line))
            .map(|p| p.kind)
    }

    /// Classify a trimmed line as a prompt for the given family.
    ///
    /// `family` is `None` for panes whose title carries no agent tag;
    /// `user` panes count as having no agent family. The trailing-`>`
    /// fallback only fires in that no-family case, and a bare shell
    /// prompt on a known-agent pane reports [`PromptHit::Shell`] (the
    /// agent exited) rather than idleness.
    pub fn match_prompt(&self, line: &str, family: Option<AgentFamily>) -> Option<PromptHit> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let known_agent = family.map(|f| f.is_agent()).unwrap_or(false);
        let tables = self.tables.read();
        for pattern in &tables.prompts {
            if let Some(wanted) = pattern.family {
                if Some(wanted) != family || !pattern.regex.is_match(line) {
                    continue;
                }
                return Some(PromptHit::Agent);
            }
            if !pattern.regex.is_match(line) {
                continue;
            }
            match pattern.kind {
                PromptKind::Shell if known_agent => return Some(PromptHit::Shell),
                PromptKind::GenericGt if known_agent => continue,
                _ => return Some(PromptHit::Agent),
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
