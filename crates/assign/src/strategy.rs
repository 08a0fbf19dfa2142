// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy selection over scored pairs.
//!
//! Every strategy returns a deterministic selection: sorts carry full
//! tie-break chains down to pane id and task position, so equal inputs
//! produce bit-identical matchings.

use crate::score::{confidence, score_pair, AgentCandidate, ScoreConfig};
use muster_core::{ScoreBreakdown, TriageRecommendation};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Spread load evenly across agents
    #[default]
    Balanced,
    /// Highest scores first, fastest dispatch
    Speed,
    /// Best agent per task, then dedupe
    Quality,
    /// Unblock the most downstream work first
    Dependency,
    /// Deterministic pane rotation
    RoundRobin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balanced" => Ok(Strategy::Balanced),
            "speed" => Ok(Strategy::Speed),
            "quality" => Ok(Strategy::Quality),
            "dependency" => Ok(Strategy::Dependency),
            "round-robin" | "roundrobin" => Ok(Strategy::RoundRobin),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Balanced => "balanced",
            Strategy::Speed => "speed",
            Strategy::Quality => "quality",
            Strategy::Dependency => "dependency",
            Strategy::RoundRobin => "round-robin",
        };
        write!(f, "{}", s)
    }
}

/// One selected (agent, task) pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPair {
    pub agent_index: usize,
    pub task_index: usize,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub reason: String,
    pub confidence: f64,
}

struct ScoredPair {
    agent: usize,
    task: usize,
    breakdown: ScoreBreakdown,
    total: f64,
}

fn score_all(
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
    config: &ScoreConfig,
) -> Vec<ScoredPair> {
    let mut pairs = Vec::with_capacity(agents.len() * tasks.len());
    for (a, agent) in agents.iter().enumerate() {
        for (t, task) in tasks.iter().enumerate() {
            let breakdown = score_pair(agent, task, config);
            pairs.push(ScoredPair {
                agent: a,
                task: t,
                total: breakdown.total(),
                breakdown,
            });
        }
    }
    pairs
}

fn reason_for(strategy: Strategy, breakdown: &ScoreBreakdown) -> String {
    let lead = match strategy {
        Strategy::Balanced => "balanced: lowest current load",
        Strategy::Speed => "speed: highest score available",
        Strategy::Quality => "quality: best agent for the task",
        Strategy::Dependency => "dependency: unblocks downstream work",
        Strategy::RoundRobin => "round-robin rotation",
    };
    let terms: Vec<String> = breakdown
        .salient_terms()
        .iter()
        .map(|(name, value)| format!("{} {:+.2}", name, value))
        .collect();
    if terms.is_empty() {
        lead.to_string()
    } else {
        format!("{} ({})", lead, terms.join(", "))
    }
}

fn finish(
    strategy: Strategy,
    picks: Vec<(usize, usize, ScoreBreakdown)>,
) -> Vec<SelectedPair> {
    picks
        .into_iter()
        .map(|(agent, task, breakdown)| SelectedPair {
            agent_index: agent,
            task_index: task,
            score: breakdown.total(),
            confidence: confidence(&breakdown),
            reason: reason_for(strategy, &breakdown),
            breakdown,
        })
        .collect()
}

fn greedy(
    pairs: Vec<ScoredPair>,
    limit: usize,
) -> Vec<(usize, usize, ScoreBreakdown)> {
    let mut used_agents = HashSet::new();
    let mut used_tasks = HashSet::new();
    let mut picks = Vec::new();
    for pair in pairs {
        if picks.len() >= limit {
            break;
        }
        if used_agents.contains(&pair.agent) || used_tasks.contains(&pair.task) {
            continue;
        }
        used_agents.insert(pair.agent);
        used_tasks.insert(pair.task);
        picks.push((pair.agent, pair.task, pair.breakdown));
    }
    picks
}

fn by_score_desc(agents: &[AgentCandidate]) -> impl Fn(&ScoredPair, &ScoredPair) -> Ordering + '_ {
    move |a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| agents[a.agent].pane_index.cmp(&agents[b.agent].pane_index))
            .then_with(|| a.task.cmp(&b.task))
    }
}

fn select_speed(
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
    config: &ScoreConfig,
) -> Vec<(usize, usize, ScoreBreakdown)> {
    let mut pairs = score_all(agents, tasks, config);
    pairs.sort_by(by_score_desc(agents));
    greedy(pairs, agents.len().min(tasks.len()))
}

fn select_quality(
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
    config: &ScoreConfig,
) -> Vec<(usize, usize, ScoreBreakdown)> {
    // Best agent per task first, then dedupe agents by score
    let mut champions: Vec<ScoredPair> = Vec::new();
    for (t, task) in tasks.iter().enumerate() {
        let mut best: Option<ScoredPair> = None;
        for (a, agent) in agents.iter().enumerate() {
            let breakdown = score_pair(agent, task, config);
            let total = breakdown.total();
            let candidate = ScoredPair {
                agent: a,
                task: t,
                breakdown,
                total,
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    total > current.total
                        || (total == current.total
                            && agents[a].pane_index < agents[current.agent].pane_index)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
        if let Some(best) = best {
            champions.push(best);
        }
    }
    champions.sort_by(by_score_desc(agents));
    greedy(champions, agents.len().min(tasks.len()))
}

fn select_dependency(
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
    config: &ScoreConfig,
) -> Vec<(usize, usize, ScoreBreakdown)> {
    let mut pairs = score_all(agents, tasks, config);
    pairs.sort_by(|a, b| {
        tasks[b.task]
            .unblocks
            .len()
            .cmp(&tasks[a.task].unblocks.len())
            .then_with(|| tasks[a.task].priority.cmp(&tasks[b.task].priority))
            .then_with(|| b.total.total_cmp(&a.total))
            .then_with(|| agents[a.agent].pane_index.cmp(&agents[b.agent].pane_index))
            .then_with(|| a.task.cmp(&b.task))
    });
    greedy(pairs, agents.len().min(tasks.len()))
}

fn select_balanced(
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
    config: &ScoreConfig,
) -> Vec<(usize, usize, ScoreBreakdown)> {
    let mut loads: HashMap<usize, usize> = agents
        .iter()
        .enumerate()
        .map(|(i, a)| (i, a.existing_assignments))
        .collect();
    let mut remaining = score_all(agents, tasks, config);
    let mut picks = Vec::new();
    let limit = agents.len().min(tasks.len());

    while picks.len() < limit && !remaining.is_empty() {
        // Stable multi-level key over the live loads
        remaining.sort_by(|a, b| {
            loads[&a.agent]
                .cmp(&loads[&b.agent])
                .then_with(|| {
                    let idle_a = agents[a.agent].state.is_idle();
                    let idle_b = agents[b.agent].state.is_idle();
                    idle_b.cmp(&idle_a) // idle first
                })
                .then_with(|| {
                    agents[a.agent]
                        .last_assigned_at_ms
                        .cmp(&agents[b.agent].last_assigned_at_ms)
                })
                .then_with(|| b.total.total_cmp(&a.total))
                .then_with(|| agents[a.agent].pane_id.cmp(&agents[b.agent].pane_id))
        });
        let pick = remaining.remove(0);
        if let Some(load) = loads.get_mut(&pick.agent) {
            *load += 1;
        }
        remaining.retain(|p| p.agent != pick.agent && p.task != pick.task);
        picks.push((pick.agent, pick.task, pick.breakdown));
    }
    picks
}

fn select_round_robin(
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
) -> Vec<(usize, usize, ScoreBreakdown)> {
    if agents.is_empty() {
        return Vec::new();
    }
    // Fixed pane order; assignments 1..k rotate through it
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by_key(|&i| agents[i].pane_index);

    tasks
        .iter()
        .enumerate()
        .map(|(t, _)| {
            let agent = order[t % order.len()];
            let breakdown = ScoreBreakdown {
                base: 1.0,
                ..Default::default()
            };
            (agent, t, breakdown)
        })
        .collect()
}

/// Select a matching under `strategy`.
///
/// All strategies except round-robin use each agent and each task at most
/// once; round-robin distributes every task cyclically over the fixed
/// pane order, giving early agents one extra when counts are uneven.
pub fn select_assignments(
    strategy: Strategy,
    agents: &[AgentCandidate],
    tasks: &[TriageRecommendation],
    config: &ScoreConfig,
) -> Vec<SelectedPair> {
    let picks = match strategy {
        Strategy::Speed => select_speed(agents, tasks, config),
        Strategy::Quality => select_quality(agents, tasks, config),
        Strategy::Dependency => select_dependency(agents, tasks, config),
        Strategy::Balanced => select_balanced(agents, tasks, config),
        Strategy::RoundRobin => select_round_robin(agents, tasks),
    };
    finish(strategy, picks)
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
