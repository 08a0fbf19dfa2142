// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::pipeline::PipelineConfig;
use crate::registry::PipelineRegistry;
use crate::step::LoopStep;
use muster_adapters::FakeMux;
use muster_core::{AgentFamily, FakeClock, PipelineExecution, RunId};
use muster_detect::PatternTable;
use serde_json::json;

fn rig() -> (FakeMux, Arc<PipelineExecutor<FakeMux, FakeClock>>, Arc<FakeClock>) {
    let mux = FakeMux::new();
    let clock = Arc::new(FakeClock::new(1_000_000));
    let executor = Arc::new(PipelineExecutor::new(
        mux.clone(),
        Arc::new(PatternTable::new()),
        Arc::clone(&clock),
        PipelineConfig::default(),
    ));
    (mux, executor, clock)
}

fn state() -> Arc<ExecState> {
    Arc::new(ExecState::new(PipelineExecution::new(
        RunId::new("run-1"),
        "review-loop",
        "dev",
        1_000_000,
    )))
}

#[tokio::test(start_paused = true)]
async fn a_loop_of_agent_steps_runs_per_item() {
    let (mux, executor, clock) = rig();
    let pane = mux.add_pane("dev", 0, "dev__cc_1");
    mux.set_scrollback(&pane, "claude>");

    let state = state();
    state.set_var("targets", json!(["a.rs", "b.rs"]));
    let steps = vec![Step::looped(
        "sweep",
        LoopStep {
            items: Some("${targets}".to_string()),
            steps: vec![Step::agent("fix", AgentFamily::Claude, "fix ${item}")],
            ..Default::default()
        },
    )];

    let status = execute_steps(
        executor,
        "dev",
        &steps,
        &state,
        &CancellationToken::new(),
        clock.as_ref(),
        None,
    )
    .await;

    assert_eq!(status, RunStatus::Completed);
    assert!(state.step("sweep_iter0_fix").is_some());
    assert!(state.step("sweep_iter1_fix").is_some());

    let sent = mux.sent_keys(&pane);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "fix a.rs");
    assert_eq!(sent[1].0, "fix b.rs");
    assert_eq!(state.snapshot().progress().percent, 100);
}

#[tokio::test(start_paused = true)]
async fn top_level_agent_failure_respects_policy() {
    let (mux, executor, clock) = rig();
    let pane = mux.add_pane("dev", 0, "dev__cc_1");
    mux.set_scrollback(&pane, "claude>");

    // No gemini pane exists, so the first step fails
    let state_a = state();
    let steps = vec![
        Step::agent("ghost", AgentFamily::Gemini, "go"),
        Step::agent("after", AgentFamily::Claude, "go"),
    ];
    let status = execute_steps(
        Arc::clone(&executor),
        "dev",
        &steps,
        &state_a,
        &CancellationToken::new(),
        clock.as_ref(),
        None,
    )
    .await;
    assert_eq!(status, RunStatus::Failed);
    assert!(state_a.step("after").is_none());

    // A workflow-wide continue policy lets the run finish
    let state_b = state();
    let status = execute_steps(
        executor,
        "dev",
        &steps,
        &state_b,
        &CancellationToken::new(),
        clock.as_ref(),
        Some(OnError::Continue),
    )
    .await;
    assert_eq!(status, RunStatus::Completed);
    assert!(state_b.step("after").is_some());
}

#[tokio::test(start_paused = true)]
async fn registry_sees_live_progress_and_cancels() {
    let (mux, executor, clock) = rig();
    let pane = mux.add_pane("dev", 0, "dev__cc_1");
    // Forever-working pane: fresh activity, no prompt
    mux.set_scrollback(&pane, "crunching...");
    mux.set_last_activity(&pane, 999_999);

    let registry = PipelineRegistry::new();
    let state = state();
    let handle = registry.register(Arc::clone(&state));

    let steps = vec![Step::agent("slow", AgentFamily::Claude, "go")];
    let run = execute_steps(
        executor,
        "dev",
        &steps,
        &state,
        &handle.cancel,
        clock.as_ref(),
        None,
    );
    let canceller = async {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert!(registry.cancel(&RunId::new("run-1")));
    };
    let (status, _) = tokio::join!(run, canceller);

    assert_eq!(status, RunStatus::Cancelled);
    assert_eq!(
        registry.get(&RunId::new("run-1")).unwrap().status,
        RunStatus::Cancelled
    );
}
