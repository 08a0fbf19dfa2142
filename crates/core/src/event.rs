// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination events and the file-conflict record.

use crate::agent::{AgentState, PaneId};
use crate::triage::BeadId;
use serde::{Deserialize, Serialize};

/// A reservation request that lost to existing holders.
///
/// Emitted by the reservation watcher; consumed by the conflict bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConflict {
    pub path: String,
    pub requestor_agent: String,
    pub requestor_pane: PaneId,
    pub session: String,
    pub holders: Vec<String>,
    /// Server-side reservation ids, targets for force-release
    pub holder_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_since_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
    pub detected_at_ms: u64,
}

impl FileConflict {
    /// Milliseconds until the holder's reservation expires; 0 once past.
    pub fn time_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms
            .map(|exp| exp.saturating_sub(now_ms))
            .unwrap_or(0)
    }

    /// Milliseconds since the holder reserved, when known.
    pub fn time_since_reserved_ms(&self, now_ms: u64) -> Option<u64> {
        self.reserved_since_ms
            .map(|since| now_ms.saturating_sub(since))
    }

    /// False when the expiry is unknown.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.map(|exp| exp < now_ms).unwrap_or(false)
    }
}

/// Events published on the coordination stream.
///
/// The stream is bounded and non-blocking: producers drop events when the
/// channel is full rather than stall dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CoordEvent {
    WorkAssigned {
        bead_id: BeadId,
        agent_name: String,
        pane_index: u32,
        score: f64,
    },
    AgentStateChanged {
        pane_id: PaneId,
        state: AgentState,
    },
    FileConflict {
        conflict: FileConflict,
    },
    ReservationRenewed {
        agent: String,
        count: usize,
    },
    PipelineStageStarted {
        run_id: String,
        stage: String,
    },
    PipelineStageFinished {
        run_id: String,
        stage: String,
        failed: bool,
    },
}
