// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec: round-robin distribution and matching uniqueness.

use muster_assign::{select_assignments, AgentCandidate, AgentProfile, ScoreConfig, Strategy};
use muster_core::{AgentFamily, AgentState, BeadId, PaneId, TriageRecommendation};
use std::collections::{HashMap, HashSet};

fn agent(index: u32) -> AgentCandidate {
    AgentCandidate {
        pane_id: PaneId::new(format!("%{}", index)),
        pane_index: index,
        name: format!("Agent{}", index),
        family: AgentFamily::Claude,
        state: AgentState::Idle,
        context_pct: 0.0,
        active_reservations: 0,
        existing_assignments: 0,
        last_assigned_at_ms: 0,
        profile: AgentProfile::default(),
    }
}

fn task(id: usize) -> TriageRecommendation {
    TriageRecommendation {
        bead_id: BeadId::new(format!("bd-{}", id)),
        title: format!("task {}", id),
        bead_type: "task".to_string(),
        priority: 1,
        score: 0.1 * id as f64,
        reasons: vec![],
        unblocks: vec![],
        status: String::new(),
        pagerank: 0.0,
        blocker_ratio: 0.0,
        time_to_impact: 0.0,
    }
}

#[test]
fn round_robin_five_agents_ten_tasks() {
    let agents: Vec<AgentCandidate> = (0..5).map(agent).collect();
    let tasks: Vec<TriageRecommendation> = (0..10).map(task).collect();

    let first = select_assignments(Strategy::RoundRobin, &agents, &tasks, &ScoreConfig::default());
    let second = select_assignments(Strategy::RoundRobin, &agents, &tasks, &ScoreConfig::default());
    // Bit-exact across runs
    assert_eq!(first, second);

    // Each agent gets exactly two tasks, no task twice, all score 1.0
    let mut per_agent: HashMap<usize, usize> = HashMap::new();
    let mut seen_tasks = HashSet::new();
    for pair in &first {
        *per_agent.entry(pair.agent_index).or_default() += 1;
        assert!(seen_tasks.insert(pair.task_index));
        assert_eq!(pair.score, 1.0);
    }
    assert!(per_agent.values().all(|&n| n == 2));

    // Deterministic pane order rotation
    for (i, pair) in first.iter().enumerate() {
        assert_eq!(pair.agent_index, i % 5);
    }
}

#[test]
fn matchings_never_repeat_agents_or_tasks() {
    let agents: Vec<AgentCandidate> = (0..4).map(agent).collect();
    let tasks: Vec<TriageRecommendation> = (0..6).map(task).collect();

    for strategy in [
        Strategy::Balanced,
        Strategy::Speed,
        Strategy::Quality,
        Strategy::Dependency,
    ] {
        let pairs = select_assignments(strategy, &agents, &tasks, &ScoreConfig::default());
        let agents_used: HashSet<usize> = pairs.iter().map(|p| p.agent_index).collect();
        let tasks_used: HashSet<usize> = pairs.iter().map(|p| p.task_index).collect();
        assert_eq!(agents_used.len(), pairs.len(), "{:?} repeated an agent", strategy);
        assert_eq!(tasks_used.len(), pairs.len(), "{:?} repeated a task", strategy);
    }
}
