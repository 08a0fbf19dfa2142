// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loop execution.
//!
//! One loop shape per step, chosen by priority: for-each, while, times.
//! Loop variables are bound per iteration and cleared on every exit
//! path, including cancellation and failure.

use crate::expr::{eval_condition, resolve_items};
use crate::state::ExecState;
use crate::step::{LoopStep, OnError, Step, StepKind};
use async_trait::async_trait;
use muster_core::{StepResult, StepStatus};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Runs one non-loop step; implemented by the pipeline executor and by
/// test fakes.
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run_step(&self, step: &Step, step_id: &str, state: &ExecState) -> StepResult;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("loop cancelled")]
    Cancelled,
    #[error("step {step_id} failed: {error}")]
    StepFailed { step_id: String, error: String },
    #[error("loop exceeded max_iterations ({0})")]
    IterationCap(u64),
}

/// What a finished loop produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopOutcome {
    pub iterations: u64,
    pub collected: Vec<Value>,
}

enum Shape {
    ForEach(Vec<Value>),
    While(String),
    Times(u64),
}

fn clear_loop_vars(state: &ExecState, alias: &str) {
    state.remove_var(alias);
    state.remove_var("index");
    state.remove_var("total");
}

enum IterationFlow {
    Proceed,
    Break,
    Continue,
}

/// Execute one loop step.
///
/// Nested steps get synthesized ids `<loop_id>_iter<i>_<step_id>` and
/// their results land in the shared state under the writer lock. A
/// failing step consults its `on_error`, falling back to the workflow
/// default, then to `fail`.
pub fn run_loop<'a, R: StepRunner>(
    loop_step: &'a LoopStep,
    loop_id: &'a str,
    runner: &'a R,
    state: &'a ExecState,
    cancel: &'a CancellationToken,
    workflow_on_error: Option<OnError>,
) -> Pin<Box<dyn Future<Output = Result<LoopOutcome, LoopError>> + Send + 'a>>
where
    R: Sync,
{
    Box::pin(run_loop_inner(
        loop_step,
        loop_id,
        runner,
        state,
        cancel,
        workflow_on_error,
    ))
}

async fn run_loop_inner<R: StepRunner>(
    loop_step: &LoopStep,
    loop_id: &str,
    runner: &R,
    state: &ExecState,
    cancel: &CancellationToken,
    workflow_on_error: Option<OnError>,
) -> Result<LoopOutcome, LoopError> {
    let shape = if let Some(items_expr) = &loop_step.items {
        Shape::ForEach(resolve_items(items_expr, &state.vars()))
    } else if let Some(condition) = &loop_step.condition {
        Shape::While(condition.clone())
    } else {
        Shape::Times(loop_step.times.unwrap_or(0))
    };

    let known_total: Option<u64> = match &shape {
        Shape::ForEach(items) => Some(items.len() as u64),
        Shape::Times(n) => Some(*n),
        Shape::While(_) => None,
    };

    let mut collected = Vec::new();
    let mut iteration: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            clear_loop_vars(state, &loop_step.alias);
            return Err(LoopError::Cancelled);
        }
        if iteration >= loop_step.max_iterations {
            clear_loop_vars(state, &loop_step.alias);
            return Err(LoopError::IterationCap(loop_step.max_iterations));
        }

        // Header: decide whether this iteration runs, and bind loop vars
        let element = match &shape {
            Shape::ForEach(items) => match items.get(iteration as usize) {
                Some(element) => element.clone(),
                None => break,
            },
            Shape::Times(n) => {
                if iteration >= *n {
                    break;
                }
                Value::from(iteration)
            }
            Shape::While(condition) => {
                if !eval_condition(condition, &state.vars()) {
                    break;
                }
                Value::from(iteration)
            }
        };
        state.set_var(&loop_step.alias, element);
        state.set_var("index", Value::from(iteration));
        if let Some(total) = known_total {
            state.set_var("total", Value::from(total));
        }

        match run_iteration(
            loop_step,
            loop_id,
            iteration,
            runner,
            state,
            cancel,
            workflow_on_error,
            &mut collected,
        )
        .await?
        {
            IterationFlow::Break => break,
            IterationFlow::Proceed | IterationFlow::Continue => {}
        }

        iteration += 1;
        let is_last = known_total.map(|t| iteration >= t).unwrap_or(false);
        if !loop_step.delay.is_zero() && !is_last {
            tokio::select! {
                _ = cancel.cancelled() => {
                    clear_loop_vars(state, &loop_step.alias);
                    return Err(LoopError::Cancelled);
                }
                _ = tokio::time::sleep(loop_step.delay) => {}
            }
        }
    }

    clear_loop_vars(state, &loop_step.alias);
    if let Some(name) = &loop_step.collect {
        state.set_var(name, Value::Array(collected.clone()));
    }
    Ok(LoopOutcome {
        iterations: iteration,
        collected,
    })
}

#[allow(clippy::too_many_arguments)]
async fn run_iteration<R: StepRunner>(
    loop_step: &LoopStep,
    loop_id: &str,
    iteration: u64,
    runner: &R,
    state: &ExecState,
    cancel: &CancellationToken,
    workflow_on_error: Option<OnError>,
    collected: &mut Vec<Value>,
) -> Result<IterationFlow, LoopError> {
    let mut last_result: Option<StepResult> = None;
    let mut flow = IterationFlow::Proceed;

    for step in &loop_step.steps {
        if cancel.is_cancelled() {
            clear_loop_vars(state, &loop_step.alias);
            return Err(LoopError::Cancelled);
        }
        let gate_open = step
            .when
            .as_ref()
            .map(|cond| eval_condition(cond, &state.vars()))
            .unwrap_or(true);

        match &step.kind {
            StepKind::Break => {
                if gate_open {
                    flow = IterationFlow::Break;
                    break;
                }
                continue;
            }
            StepKind::Continue => {
                if gate_open {
                    flow = IterationFlow::Continue;
                    break;
                }
                continue;
            }
            _ => {}
        }

        let step_id = format!("{}_iter{}_{}", loop_id, iteration, step.id);
        if !gate_open {
            let mut skipped = StepResult::pending(&step_id);
            skipped.status = StepStatus::Skipped;
            state.record_step(skipped);
            continue;
        }

        let result = match &step.kind {
            StepKind::Loop(nested) => {
                // Nested loops run inline; the box breaks the async
                // recursion cycle
                let outcome =
                    run_loop(nested, &step_id, runner, state, cancel, workflow_on_error).await;
                let mut result = StepResult::pending(&step_id);
                match outcome {
                    Ok(outcome) => {
                        result.status = StepStatus::Completed;
                        result.parsed_data = Some(Value::Array(outcome.collected));
                    }
                    Err(LoopError::Cancelled) => {
                        clear_loop_vars(state, &loop_step.alias);
                        return Err(LoopError::Cancelled);
                    }
                    Err(e) => {
                        result.status = StepStatus::Failed;
                        result.error = Some(e.to_string());
                    }
                }
                result
            }
            _ => runner.run_step(step, &step_id, state).await,
        };

        state.record_step(result.clone());
        if result.status == StepStatus::Failed {
            let policy = step
                .on_error
                .or(workflow_on_error)
                .unwrap_or(OnError::Fail);
            if policy.aborts() {
                clear_loop_vars(state, &loop_step.alias);
                return Err(LoopError::StepFailed {
                    step_id: step_id.clone(),
                    error: result.error.unwrap_or_else(|| "step failed".to_string()),
                });
            }
            tracing::debug!(step_id, "step failed, continuing per on_error policy");
        }
        last_result = Some(result);
    }

    // Collect runs on every iteration exit, including break and
    // continue: steps that ran before the control fired still count
    if loop_step.collect.is_some() {
        if let Some(last) = last_result {
            collected.push(
                last.parsed_data
                    .unwrap_or(Value::String(last.output)),
            );
        }
    }
    Ok(flow)
}

#[cfg(test)]
#[path = "loops_tests.rs"]
mod tests;
