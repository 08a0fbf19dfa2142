// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State detection over pane scrollback.
//!
//! Precedence: error patterns, then prompt lines (last three non-empty),
//! then the activity window, then the per-family default. Classification
//! is pure; only the scrollback capture and activity lookup are async.

use crate::ansi::strip_ansi;
use crate::patterns::{PatternTable, PromptHit};
use muster_adapters::{MuxClient, MuxError, Pane};
use muster_core::{AgentFamily, AgentState, AgentStatus, Clock, PaneId, PaneTitle};
use std::sync::Arc;
use thiserror::Error;

/// Detector tuning; read-only after construction.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Scrollback lines to scan for error patterns
    pub scan_lines: usize,
    /// Activity younger than this means Working
    pub activity_threshold_ms: u64,
    /// Output preview size cap, bytes
    pub preview_bytes: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scan_lines: 50,
            activity_threshold_ms: 5_000,
            preview_bytes: 200,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("multiplexer: {0}")]
    Mux(#[from] MuxError),
}

/// Classify stripped-or-raw scrollback into an agent state.
///
/// Pure: two calls with the same inputs yield the same state. `family`
/// is `None` when the pane title carries no agent tag.
pub fn classify(
    scrollback: &str,
    family: Option<AgentFamily>,
    activity_age_ms: u64,
    config: &DetectorConfig,
    patterns: &PatternTable,
) -> AgentState {
    let stripped = strip_ansi(scrollback);
    let lines: Vec<&str> = stripped.lines().collect();

    // Errors first, newest line wins
    let scan_start = lines.len().saturating_sub(config.scan_lines);
    for line in lines[scan_start..].iter().rev() {
        if let Some(kind) = patterns.match_error(line) {
            return AgentState::Error(kind);
        }
    }

    // Prompts on the last three non-empty lines
    let known_agent = family.map(|f| f.is_agent()).unwrap_or(false);
    for line in lines
        .iter()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(3)
    {
        match patterns.match_prompt(line, family) {
            Some(PromptHit::Agent) => return AgentState::Idle,
            // Bare shell prompt on an agent pane: the agent exited
            Some(PromptHit::Shell) => return AgentState::Unknown,
            None => {}
        }
    }

    if activity_age_ms < config.activity_threshold_ms {
        return AgentState::Working;
    }
    if known_agent {
        AgentState::Idle
    } else {
        AgentState::Unknown
    }
}

/// UTF-8-safe suffix of at most `max_bytes` bytes.
///
/// A suffix that would begin mid-rune advances to the next rune start;
/// when no rune fits the result is empty.
pub fn utf8_tail(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut start = s.len() - max_bytes;
    while start < s.len() && !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Pane state detector bound to a multiplexer client.
#[derive(Clone)]
pub struct StateDetector<M: MuxClient, C: Clock> {
    mux: M,
    patterns: Arc<PatternTable>,
    config: DetectorConfig,
    clock: Arc<C>,
}

impl<M: MuxClient, C: Clock> StateDetector<M, C> {
    pub fn new(mux: M, patterns: Arc<PatternTable>, config: DetectorConfig, clock: Arc<C>) -> Self {
        Self {
            mux,
            patterns,
            config,
            clock,
        }
    }

    /// Detect the state of one pane, deriving the family from its title.
    pub async fn detect_pane(&self, pane: &Pane) -> Result<AgentStatus, DetectError> {
        let family = PaneTitle::parse(&pane.title).map(|t| t.family);
        self.detect(&pane.id, family).await
    }

    /// Detect the state of one pane with a known family tag.
    pub async fn detect(
        &self,
        pane_id: &PaneId,
        family: Option<AgentFamily>,
    ) -> Result<AgentStatus, DetectError> {
        let scrollback = self
            .mux
            .capture_pane(pane_id, self.config.scan_lines as u32)
            .await?;
        let last_activity_ms = self.mux.pane_last_activity(pane_id).await?;
        let now_ms = self.clock.epoch_ms();
        let age_ms = now_ms.saturating_sub(last_activity_ms);

        let state = classify(&scrollback, family, age_ms, &self.config, &self.patterns);
        let stripped = strip_ansi(&scrollback);
        Ok(AgentStatus {
            pane_id: pane_id.clone(),
            family: family.unwrap_or(AgentFamily::User),
            state,
            last_activity_ms,
            output_preview: utf8_tail(&stripped, self.config.preview_bytes).to_string(),
            detected_at_ms: now_ms,
        })
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
