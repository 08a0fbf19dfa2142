// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline stage execution.
//!
//! Stages run strictly in order. Each stage picks an idle-capable pane
//! by agent family (and model when specified, with a relaxed second pass
//! that ignores it), captures the scrollback before sending, delivers the
//! prompt, then watches the state detector until the agent goes idle or
//! the stage cap expires. The stage output is the scrollback suffix that
//! appeared during the stage.

use crate::expr::substitute;
use crate::state::ExecState;
use crate::step::OnError;
use muster_adapters::{MuxClient, Pane};
use muster_core::{
    AgentFamily, AgentState, Clock, PaneTitle, RunStatus, StepResult, StepStatus,
};
use muster_detect::{DetectorConfig, PatternTable, StateDetector};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Length of the `before` tail used to locate new output.
const TAIL_PROBE_CHARS: usize = 100;

/// Cap on previous-stage context prepended to a prompt, bytes.
const PREV_CONTEXT_CAP: usize = 1_500;

/// Pipeline executor tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub capture_lines: u32,
    /// Settle time after sending a prompt before polling the detector
    pub debounce: Duration,
    pub poll_interval: Duration,
    /// Hard cap per stage
    pub stage_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture_lines: 50,
            debounce: Duration::from_secs(2),
            poll_interval: Duration::from_secs(1),
            stage_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub id: String,
    pub agent_type: AgentFamily,
    pub model: Option<String>,
    pub prompt: String,
    pub on_error: Option<OnError>,
}

impl StageSpec {
    pub fn new(id: &str, agent_type: AgentFamily, prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            agent_type,
            model: None,
            prompt: prompt.to_string(),
            on_error: None,
        }
    }
}

/// The scrollback suffix that is new in `after` relative to `before`.
///
/// Prefers a direct prefix check; otherwise locates the last
/// `TAIL_PROBE_CHARS` characters of `before` inside `after`. When
/// neither anchors, the whole `after` capture is returned.
pub fn extract_new_output(before: &str, after: &str) -> String {
    if let Some(suffix) = after.strip_prefix(before) {
        return suffix.to_string();
    }
    let tail_start = before
        .char_indices()
        .rev()
        .nth(TAIL_PROBE_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let tail = &before[tail_start..];
    if !tail.is_empty() {
        if let Some(pos) = after.rfind(tail) {
            return after[pos + tail.len()..].to_string();
        }
    }
    after.to_string()
}

/// Executes stage lists against live panes.
pub struct PipelineExecutor<M: MuxClient, C: Clock> {
    mux: M,
    detector: StateDetector<M, C>,
    clock: Arc<C>,
    config: PipelineConfig,
}

impl<M: MuxClient, C: Clock> PipelineExecutor<M, C> {
    pub fn new(mux: M, patterns: Arc<PatternTable>, clock: Arc<C>, config: PipelineConfig) -> Self {
        let detector = StateDetector::new(
            mux.clone(),
            patterns,
            DetectorConfig {
                scan_lines: config.capture_lines as usize,
                ..DetectorConfig::default()
            },
            Arc::clone(&clock),
        );
        Self {
            mux,
            detector,
            clock,
            config,
        }
    }

    /// Run every stage in order, recording results into `state`.
    pub async fn execute(
        &self,
        session: &str,
        stages: &[StageSpec],
        state: &ExecState,
        cancel: &CancellationToken,
    ) -> RunStatus {
        let mut previous: Option<StepResult> = None;

        for stage in stages {
            let result = self
                .run_stage(session, stage, previous.as_ref(), state, cancel)
                .await;
            state.record_step(result.clone());

            match result.status {
                StepStatus::Cancelled => {
                    state.finish(RunStatus::Cancelled, self.clock.epoch_ms());
                    return RunStatus::Cancelled;
                }
                StepStatus::Failed => {
                    let policy = stage.on_error.unwrap_or(OnError::Fail);
                    if policy.aborts() {
                        state.finish(RunStatus::Failed, self.clock.epoch_ms());
                        return RunStatus::Failed;
                    }
                }
                _ => {}
            }
            previous = Some(result);
        }

        state.finish(RunStatus::Completed, self.clock.epoch_ms());
        RunStatus::Completed
    }

    /// Find a pane for a stage: family and model first, then family
    /// alone.
    async fn pick_pane(&self, session: &str, stage: &StageSpec) -> Option<Pane> {
        let panes = self.mux.list_panes(session).await.ok()?;
        let of_family = |pane: &&Pane| {
            PaneTitle::parse(&pane.title)
                .map(|t| t.family == stage.agent_type)
                .unwrap_or(false)
        };
        if let Some(model) = &stage.model {
            if let Some(pane) = panes
                .iter()
                .filter(of_family)
                .find(|p| &p.variant == model)
            {
                return Some(pane.clone());
            }
        }
        panes.iter().find(of_family).cloned()
    }

    /// Run one stage in isolation (the step-tree runner path).
    pub async fn run_stage(
        &self,
        session: &str,
        stage: &StageSpec,
        previous: Option<&StepResult>,
        state: &ExecState,
        cancel: &CancellationToken,
    ) -> StepResult {
        let mut result = StepResult::pending(&stage.id);
        result.agent_type = Some(stage.agent_type);
        result.started_at_ms = self.clock.epoch_ms();
        result.status = StepStatus::Running;

        let Some(pane) = self.pick_pane(session, stage).await else {
            result.status = StepStatus::Failed;
            result.error = Some(format!(
                "no pane for agent type {} in session {}",
                stage.agent_type, session
            ));
            result.finished_at_ms = Some(self.clock.epoch_ms());
            return result;
        };
        result.pane_used = Some(pane.id.clone());

        let before = match self.mux.capture_pane(&pane.id, self.config.capture_lines).await {
            Ok(before) => before,
            Err(e) => return self.fail(result, format!("capture before send: {}", e)),
        };

        let mut prompt = substitute(&stage.prompt, &state.vars());
        if let Some(previous) = previous {
            let differs = previous.pane_used.as_ref() != Some(&pane.id);
            if differs && !previous.output.is_empty() {
                let context = tail_bytes(&previous.output, PREV_CONTEXT_CAP);
                prompt = format!("Previous stage output:\n{}\n\n{}", context, prompt);
            }
        }
        if let Err(e) = self.mux.send_keys(&pane.id, &prompt, true).await {
            return self.fail(result, format!("send prompt: {}", e));
        }

        // Debounce, then poll until idle or the stage cap
        let deadline = tokio::time::Instant::now() + self.config.stage_timeout;
        tokio::select! {
            _ = cancel.cancelled() => return self.cancelled(result),
            _ = tokio::time::sleep(self.config.debounce) => {}
        }
        loop {
            match self.detector.detect(&pane.id, Some(stage.agent_type)).await {
                Ok(status) => match status.state {
                    AgentState::Idle => break,
                    AgentState::Error(kind) => {
                        return self.fail(result, format!("agent error: {}", kind));
                    }
                    AgentState::Working | AgentState::Unknown => {}
                },
                Err(e) => return self.fail(result, format!("detect: {}", e)),
            }
            if tokio::time::Instant::now() >= deadline {
                return self.fail(result, "stage timed out".to_string());
            }
            tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(result),
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        let after = match self.mux.capture_pane(&pane.id, self.config.capture_lines).await {
            Ok(after) => after,
            Err(e) => return self.fail(result, format!("capture after stage: {}", e)),
        };
        let output = extract_new_output(&before, &after);
        result.parsed_data = parse_structured(&output);
        state.set_var(&stage.id, json!({ "output": output }));
        result.output = output;
        result.status = StepStatus::Completed;
        result.finished_at_ms = Some(self.clock.epoch_ms());
        result
    }

    fn fail(&self, mut result: StepResult, error: String) -> StepResult {
        result.status = StepStatus::Failed;
        result.error = Some(error);
        result.finished_at_ms = Some(self.clock.epoch_ms());
        result
    }

    fn cancelled(&self, mut result: StepResult) -> StepResult {
        result.status = StepStatus::Cancelled;
        result.error = Some("cancelled".to_string());
        result.finished_at_ms = Some(self.clock.epoch_ms());
        result
    }
}

/// Last JSON object/array in the output, when the stage emitted one.
fn parse_structured(output: &str) -> Option<serde_json::Value> {
    let trimmed = output.trim();
    let start = trimmed.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let last_line = trimmed[start..].trim();
    if last_line.starts_with('{') || last_line.starts_with('[') {
        serde_json::from_str(last_line).ok()
    } else {
        None
    }
}

fn tail_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while start < s.len() && !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
