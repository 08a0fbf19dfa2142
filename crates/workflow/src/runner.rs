// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step-tree execution.
//!
//! Top-level steps run sequentially: agent steps dispatch through the
//! pipeline executor, loops recurse through the loop executor with the
//! same runner. One `ExecState` carries variables and results across the
//! whole tree.

use crate::loops::{run_loop, LoopError, StepRunner};
use crate::pipeline::{PipelineExecutor, StageSpec};
use crate::state::ExecState;
use crate::step::{OnError, Step, StepKind};
use async_trait::async_trait;
use muster_adapters::MuxClient;
use muster_core::{Clock, RunStatus, StepResult, StepStatus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Dispatches agent steps to live panes for one run.
pub struct WorkflowRunner<M: MuxClient, C: Clock> {
    executor: Arc<PipelineExecutor<M, C>>,
    session: String,
    cancel: CancellationToken,
}

impl<M: MuxClient, C: Clock> WorkflowRunner<M, C> {
    pub fn new(
        executor: Arc<PipelineExecutor<M, C>>,
        session: &str,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            executor,
            session: session.to_string(),
            cancel,
        }
    }
}

#[async_trait]
impl<M: MuxClient, C: Clock + 'static> StepRunner for WorkflowRunner<M, C> {
    async fn run_step(&self, step: &Step, step_id: &str, state: &ExecState) -> StepResult {
        match &step.kind {
            StepKind::Agent {
                agent_type,
                model,
                prompt,
            } => {
                let stage = StageSpec {
                    id: step_id.to_string(),
                    agent_type: *agent_type,
                    model: model.clone(),
                    prompt: prompt.clone(),
                    on_error: step.on_error,
                };
                self.executor
                    .run_stage(&self.session, &stage, None, state, &self.cancel)
                    .await
            }
            other => {
                // Loop and control steps are the loop executor's job
                let mut result = StepResult::pending(step_id);
                result.status = StepStatus::Failed;
                result.error = Some(format!("step kind {:?} cannot run standalone", other));
                result
            }
        }
    }
}

/// Execute a tree of top-level steps for one run.
pub async fn execute_steps<M: MuxClient, C: Clock + 'static>(
    executor: Arc<PipelineExecutor<M, C>>,
    session: &str,
    steps: &[Step],
    state: &ExecState,
    cancel: &CancellationToken,
    clock: &C,
    default_on_error: Option<OnError>,
) -> RunStatus {
    let runner = WorkflowRunner::new(Arc::clone(&executor), session, cancel.clone());

    for step in steps {
        if cancel.is_cancelled() {
            state.finish(RunStatus::Cancelled, clock.epoch_ms());
            return RunStatus::Cancelled;
        }
        let failed = match &step.kind {
            StepKind::Loop(spec) => {
                match run_loop(spec, &step.id, &runner, state, cancel, default_on_error).await {
                    Ok(_) => false,
                    Err(LoopError::Cancelled) => {
                        state.finish(RunStatus::Cancelled, clock.epoch_ms());
                        return RunStatus::Cancelled;
                    }
                    Err(e) => {
                        let mut result = StepResult::pending(&step.id);
                        result.status = StepStatus::Failed;
                        result.error = Some(e.to_string());
                        state.record_step(result);
                        true
                    }
                }
            }
            StepKind::Break | StepKind::Continue => {
                tracing::debug!(step = %step.id, "loop control outside a loop, ignoring");
                false
            }
            StepKind::Agent { .. } => {
                let result = runner.run_step(step, &step.id, state).await;
                state.record_step(result.clone());
                match result.status {
                    StepStatus::Cancelled => {
                        state.finish(RunStatus::Cancelled, clock.epoch_ms());
                        return RunStatus::Cancelled;
                    }
                    StepStatus::Failed => true,
                    _ => false,
                }
            }
        };

        if failed {
            let policy = step.on_error.or(default_on_error).unwrap_or(OnError::Fail);
            if policy.aborts() {
                state.finish(RunStatus::Failed, clock.epoch_ms());
                return RunStatus::Failed;
            }
        }
    }
    state.finish(RunStatus::Completed, clock.epoch_ms());
    RunStatus::Completed
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
