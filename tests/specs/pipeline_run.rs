// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec: pipeline output extraction and a two-stage run over fake panes.

use muster_adapters::FakeMux;
use muster_core::{AgentFamily, FakeClock, PipelineExecution, RunId, RunStatus};
use muster_detect::PatternTable;
use muster_workflow::{
    extract_new_output, ExecState, PipelineConfig, PipelineExecutor, StageSpec,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[test]
fn new_output_is_the_scrollback_suffix() {
    let before = "abc\nprompt1\n";
    let after = "abc\nprompt1\nresult line\n$";
    assert_eq!(extract_new_output(before, after), "result line\n$");
}

#[tokio::test(start_paused = true)]
async fn two_stage_pipeline_feeds_review_from_draft() {
    let mux = FakeMux::new();
    let author = mux.add_pane("dev", 0, "dev__cc_1");
    let reviewer = mux.add_pane("dev", 1, "dev__gmi_1");
    mux.set_scrollback(&author, "claude>");
    mux.set_scrollback(&reviewer, "gemini>");

    let executor = PipelineExecutor::new(
        mux.clone(),
        Arc::new(PatternTable::new()),
        Arc::new(FakeClock::new(1_000_000)),
        PipelineConfig::default(),
    );
    let state = ExecState::new(PipelineExecution::new(
        RunId::new("run-spec"),
        "draft-review",
        "dev",
        1_000_000,
    ));
    let stages = vec![
        StageSpec::new("draft", AgentFamily::Claude, "draft the plan"),
        StageSpec::new("review", AgentFamily::Gemini, "review the plan"),
    ];

    let driver = {
        let mux = mux.clone();
        let author = author.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            mux.append_scrollback(&author, "\nplan: do the thing\nclaude>");
        }
    };
    let cancel = CancellationToken::new();
    let (status, _) = tokio::join!(
        executor.execute("dev", &stages, &state, &cancel),
        driver
    );

    assert_eq!(status, RunStatus::Completed);
    let snapshot = state.snapshot();
    assert_eq!(snapshot.progress().percent, 100);

    // The reviewer got the draft's output as context
    let sent = mux.sent_keys(&reviewer);
    assert!(sent[0].0.contains("plan: do the thing"));
    assert!(sent[0].0.ends_with("review the plan"));
}
