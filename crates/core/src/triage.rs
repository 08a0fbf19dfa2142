// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Triage recommendations from the external beads service.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier of a work item in the beads graph.
    pub struct BeadId;
}

/// A ranked work item, as returned by the beads triage endpoint.
///
/// `score` is the pagerank-weighted base score the assignment scorer
/// builds on; `unblocks` lists the bead IDs this item is blocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRecommendation {
    pub bead_id: BeadId,
    pub title: String,
    /// Work item kind: "epic", "feature", "task", "chore", ...
    #[serde(default)]
    pub bead_type: String,
    /// Priority bucket, 0 = P0 (most urgent)
    pub priority: u8,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub unblocks: Vec<BeadId>,
    /// Triage status; "blocked" items are never assigned
    #[serde(default)]
    pub status: String,
    /// Pagerank centrality in [0,1], when the beads service provides it
    #[serde(default)]
    pub pagerank: f64,
    /// Share of open work this item blocks, in [0,1]
    #[serde(default)]
    pub blocker_ratio: f64,
    /// Normalized time-to-impact estimate, in [0,1]
    #[serde(default)]
    pub time_to_impact: f64,
}

impl TriageRecommendation {
    pub fn is_blocked(&self) -> bool {
        self.status.eq_ignore_ascii_case("blocked")
    }
}
