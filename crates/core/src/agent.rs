// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent family, state, and per-pane status types.
//!
//! A pane title shaped `<session>__<type>_<n>` identifies which CLI family
//! runs inside a pane. State is detected from scrollback by muster-detect;
//! the types here are pure data shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id! {
    /// Identifier of a multiplexer pane (e.g. `%12` for tmux).
    pub struct PaneId;
}

/// The CLI tool running inside a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentFamily {
    /// Claude Code
    #[serde(rename = "cc")]
    Claude,
    /// Codex CLI
    #[serde(rename = "cod")]
    Codex,
    /// Gemini CLI
    #[serde(rename = "gmi")]
    Gemini,
    #[serde(rename = "cursor")]
    Cursor,
    #[serde(rename = "windsurf")]
    Windsurf,
    #[serde(rename = "aider")]
    Aider,
    /// A plain user shell, not an agent
    #[serde(rename = "user")]
    User,
}

impl AgentFamily {
    /// Short tag used in pane titles and handoff records.
    pub fn tag(&self) -> &'static str {
        match self {
            AgentFamily::Claude => "cc",
            AgentFamily::Codex => "cod",
            AgentFamily::Gemini => "gmi",
            AgentFamily::Cursor => "cursor",
            AgentFamily::Windsurf => "windsurf",
            AgentFamily::Aider => "aider",
            AgentFamily::User => "user",
        }
    }

    /// All known families, in pane-title tag order.
    pub fn all() -> &'static [AgentFamily] {
        &[
            AgentFamily::Claude,
            AgentFamily::Codex,
            AgentFamily::Gemini,
            AgentFamily::Cursor,
            AgentFamily::Windsurf,
            AgentFamily::Aider,
            AgentFamily::User,
        ]
    }

    /// True for every family except `user`.
    pub fn is_agent(&self) -> bool {
        !matches!(self, AgentFamily::User)
    }
}

impl fmt::Display for AgentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for AgentFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cc" => Ok(AgentFamily::Claude),
            "cod" => Ok(AgentFamily::Codex),
            "gmi" => Ok(AgentFamily::Gemini),
            "cursor" => Ok(AgentFamily::Cursor),
            "windsurf" => Ok(AgentFamily::Windsurf),
            "aider" => Ok(AgentFamily::Aider),
            "user" => Ok(AgentFamily::User),
            other => Err(UnknownFamily(other.to_string())),
        }
    }
}

/// Error for unrecognized family tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent family tag: {0}")]
pub struct UnknownFamily(pub String);

/// Parsed form of a pane title `<session>__<type>_<n>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneTitle {
    pub session: String,
    pub family: AgentFamily,
    pub ordinal: u32,
}

impl PaneTitle {
    /// Parse a pane title. Returns `None` when the title does not follow
    /// the `<session>__<type>_<n>` convention.
    pub fn parse(title: &str) -> Option<Self> {
        let (session, rest) = title.rsplit_once("__")?;
        let (tag, ordinal) = rest.rsplit_once('_')?;
        if session.is_empty() {
            return None;
        }
        Some(Self {
            session: session.to_string(),
            family: tag.parse().ok()?,
            ordinal: ordinal.parse().ok()?,
        })
    }

    /// Render back to the `<session>__<type>_<n>` form.
    pub fn render(&self) -> String {
        format!("{}__{}_{}", self.session, self.family.tag(), self.ordinal)
    }
}

/// Categorized error conditions detected in pane scrollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimit,
    Crash,
    Auth,
    Connection,
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RateLimit => write!(f, "rate limit"),
            ErrorKind::Crash => write!(f, "crash"),
            ErrorKind::Auth => write!(f, "auth"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Generic => write!(f, "error"),
        }
    }
}

/// State of an agent pane as classified from its scrollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Agent is at its prompt, ready for work
    Idle,
    /// Agent is actively producing output
    Working,
    /// An error pattern matched the scrollback
    Error(ErrorKind),
    /// No classification possible (typically a user pane)
    Unknown,
}

impl AgentState {
    pub fn is_idle(&self) -> bool {
        matches!(self, AgentState::Idle)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AgentState::Error(_))
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Idle => write!(f, "idle"),
            AgentState::Working => write!(f, "working"),
            AgentState::Error(kind) => write!(f, "error: {}", kind),
            AgentState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Snapshot of a pane's detected state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub pane_id: PaneId,
    pub family: AgentFamily,
    pub state: AgentState,
    /// Last pane activity reported by the multiplexer, epoch ms
    pub last_activity_ms: u64,
    /// Tail of the pane output (at most 200 bytes, UTF-8 clean)
    pub output_preview: String,
    /// When this snapshot was taken, epoch ms
    pub detected_at_ms: u64,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
