// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pair scoring.
//!
//! `total = base + bonuses − penalties`; every term is computed here and
//! recorded in the breakdown so reasons and confidence can cite them.

use crate::profile::AgentProfile;
use glob::Pattern;
use muster_core::{
    AgentFamily, AgentState, PaneId, ScoreBreakdown, TriageRecommendation,
};
use std::collections::BTreeSet;

/// Scorer tuning.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight of the profile-tag overlap bonus
    pub tag_weight: f64,
    /// Weight of the focus-pattern bonus
    pub focus_weight: f64,
    /// Context usage above this percentage starts penalizing
    pub context_threshold_pct: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            tag_weight: 0.15,
            focus_weight: 0.10,
            context_threshold_pct: 80.0,
        }
    }
}

/// One agent eligible for assignment.
#[derive(Debug, Clone)]
pub struct AgentCandidate {
    pub pane_id: PaneId,
    pub pane_index: u32,
    pub name: String,
    pub family: AgentFamily,
    pub state: AgentState,
    /// Context window usage, 0–100
    pub context_pct: f64,
    /// Reservations currently held by this agent
    pub active_reservations: usize,
    /// Open assignments, seeding the balanced strategy's load
    pub existing_assignments: usize,
    pub last_assigned_at_ms: u64,
    pub profile: AgentProfile,
}

/// Estimate task complexity in [0,1] from type, priority, and fan-out.
pub fn estimate_complexity(rec: &TriageRecommendation) -> f64 {
    let mut complexity: f64 = 0.5;
    complexity += match rec.bead_type.as_str() {
        "epic" => 0.3,
        "feature" => 0.2,
        "task" => -0.1,
        "chore" => -0.2,
        _ => 0.0,
    };
    if rec.priority == 0 {
        complexity -= 0.1;
    } else if rec.priority >= 3 {
        complexity += 0.1;
    }
    let unblocks = rec.unblocks.len();
    if unblocks >= 5 {
        complexity += 0.15;
    } else if unblocks >= 3 {
        complexity += 0.10;
    }
    complexity.clamp(0.0, 1.0)
}

/// Complexity class each family handles best.
fn preferred_complexity(family: AgentFamily) -> f64 {
    match family {
        AgentFamily::Claude => 0.8,
        AgentFamily::Codex => 0.55,
        AgentFamily::Cursor | AgentFamily::Windsurf => 0.5,
        AgentFamily::Gemini => 0.45,
        AgentFamily::Aider => 0.35,
        AgentFamily::User => 0.0,
    }
}

fn agent_type_bonus(family: AgentFamily, complexity: f64) -> f64 {
    let diff = complexity - preferred_complexity(family);
    if diff.abs() <= 0.2 {
        0.15
    } else if diff > 0.0 {
        // Task above the agent's class
        -0.10
    } else {
        // Agent overqualified
        -0.05
    }
}

/// Keyword prefixes mapping free-text titles to profile tags.
const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("test", "testing"),
    ("refactor", "architecture"),
    ("architect", "architecture"),
    ("design", "architecture"),
    ("doc", "documentation"),
    ("readme", "documentation"),
    ("fix", "debugging"),
    ("bug", "debugging"),
    ("debug", "debugging"),
    ("crash", "debugging"),
    ("perf", "performance"),
    ("optim", "performance"),
    ("bench", "performance"),
    ("secur", "security"),
    ("auth", "security"),
    ("deploy", "infrastructure"),
    ("infra", "infrastructure"),
    ("docker", "infrastructure"),
    ("api", "backend"),
    ("endpoint", "backend"),
    ("schema", "backend"),
];

/// Map a task title to profile tags via keyword prefixes.
pub fn derive_task_tags(title: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    for token in title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let token = token.to_ascii_lowercase();
        for (prefix, tag) in TAG_KEYWORDS {
            if token.starts_with(prefix) {
                tags.insert(tag.to_string());
            }
        }
    }
    tags
}

const MENTION_EXTENSIONS: &[&str] = &[
    "rs", "go", "py", "js", "ts", "tsx", "jsx", "md", "toml", "yaml", "yml", "json", "sh", "c",
    "h", "cpp", "rb", "java", "sql", "css", "html", "proto",
];

fn looks_like_path(token: &str) -> bool {
    if token.contains('/') || token.starts_with('.') {
        return true;
    }
    if token.contains(['*', '?', '[']) {
        return true;
    }
    match token.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && MENTION_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Extract path-like tokens from a task title.
pub fn extract_file_mentions(title: &str) -> Vec<String> {
    let mut mentions = Vec::new();
    for raw in title.split_whitespace() {
        let token = raw.trim_matches(|c: char| "\"'`,;:()<>".contains(c));
        if token.is_empty() || !looks_like_path(token) {
            continue;
        }
        if !mentions.iter().any(|m| m == token) {
            mentions.push(token.to_string());
        }
    }
    mentions
}

fn profile_tag_bonus(profile: &AgentProfile, task_tags: &BTreeSet<String>, weight: f64) -> f64 {
    if profile.tags.is_empty() {
        return 0.0;
    }
    let overlap = profile
        .tags
        .iter()
        .filter(|t| task_tags.contains(*t))
        .count();
    weight * overlap as f64 / profile.tags.len() as f64
}

fn focus_pattern_bonus(profile: &AgentProfile, mentions: &[String], weight: f64) -> f64 {
    if mentions.is_empty() || profile.focus_patterns.is_empty() {
        return 0.0;
    }
    let patterns: Vec<Pattern> = profile
        .focus_patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();
    if patterns.is_empty() {
        return 0.0;
    }
    let matched = mentions
        .iter()
        .filter(|m| patterns.iter().any(|p| p.matches(m)))
        .count();
    weight * matched as f64 / mentions.len() as f64
}

fn file_overlap_penalty(active_reservations: usize) -> f64 {
    match active_reservations {
        0 => 0.0,
        1..=2 => 0.05,
        3..=5 => 0.10,
        _ => 0.20,
    }
}

fn context_penalty(context_pct: f64, threshold: f64) -> f64 {
    if context_pct > threshold {
        (context_pct - threshold) / 100.0 * 0.5
    } else {
        0.0
    }
}

/// Score one (agent, task) pair.
pub fn score_pair(
    agent: &AgentCandidate,
    rec: &TriageRecommendation,
    config: &ScoreConfig,
) -> ScoreBreakdown {
    let complexity = estimate_complexity(rec);
    let task_tags = derive_task_tags(&rec.title);
    let mentions = extract_file_mentions(&rec.title);

    let critical_path_bonus = rec.pagerank.clamp(0.0, 1.0) * 0.15
        + 1.5 * rec.blocker_ratio
        + if rec.time_to_impact > 0.04 { 0.05 } else { 0.0 };

    ScoreBreakdown {
        base: rec.score,
        agent_type_bonus: agent_type_bonus(agent.family, complexity),
        critical_path_bonus,
        profile_tag_bonus: profile_tag_bonus(&agent.profile, &task_tags, config.tag_weight),
        focus_pattern_bonus: focus_pattern_bonus(&agent.profile, &mentions, config.focus_weight),
        file_overlap_penalty: file_overlap_penalty(agent.active_reservations),
        context_penalty: context_penalty(agent.context_pct, config.context_threshold_pct),
    }
}

/// Selection confidence in [0.1, 0.95], derived from the total score with
/// bumps for a strong critical path and dings for heavy file overlap.
pub fn confidence(breakdown: &ScoreBreakdown) -> f64 {
    let mut c = (breakdown.total() / 2.0).clamp(0.1, 0.95);
    if breakdown.critical_path_bonus >= 0.10 {
        c += 0.05;
    }
    if breakdown.file_overlap_penalty >= 0.10 {
        c -= 0.05;
    }
    c.clamp(0.1, 0.95)
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
