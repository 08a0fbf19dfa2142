// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent capability profiles.

use muster_core::AgentFamily;
use serde::{Deserialize, Serialize};

/// What an agent is good at, used for tag and focus-pattern bonuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Capability tags, e.g. "testing", "architecture"
    #[serde(default)]
    pub tags: Vec<String>,
    /// Glob patterns (with `**`) for file areas this agent should own
    #[serde(default)]
    pub focus_patterns: Vec<String>,
}

impl AgentProfile {
    pub fn new(tags: &[&str], focus_patterns: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|s| s.to_string()).collect(),
            focus_patterns: focus_patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Stock profile for a family, used when no persona supplies one.
    pub fn for_family(family: AgentFamily) -> Self {
        match family {
            AgentFamily::Claude => Self::new(&["architecture", "debugging", "testing"], &[]),
            AgentFamily::Codex => Self::new(&["backend", "testing"], &[]),
            AgentFamily::Gemini => Self::new(&["documentation", "frontend"], &[]),
            AgentFamily::Cursor | AgentFamily::Windsurf => Self::new(&["frontend"], &[]),
            AgentFamily::Aider => Self::new(&["debugging"], &[]),
            AgentFamily::User => Self::default(),
        }
    }
}
