// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster status` - detect and display per-pane agent states.

use crate::output::{emit_err, emit_ok, OutputFormat};
use clap::Args;
use muster_adapters::{MuxClient, MuxError, TmuxMux};
use muster_core::{ErrorCode, SystemClock};
use muster_detect::{DetectorConfig, PatternTable, StateDetector};
use std::sync::Arc;

#[derive(Args)]
pub struct StatusArgs {
    /// Session to inspect
    #[arg(long)]
    pub session: String,
}

pub async fn run(args: StatusArgs, format: OutputFormat) -> i32 {
    let mux = TmuxMux::new();
    let detector = StateDetector::new(
        mux.clone(),
        Arc::new(PatternTable::new()),
        DetectorConfig::default(),
        Arc::new(SystemClock),
    );

    let panes = match mux.list_panes(&args.session).await {
        Ok(panes) => panes,
        Err(MuxError::SessionNotFound(e)) => {
            return emit_err(format, ErrorCode::SessionNotFound, &e);
        }
        Err(e) => return emit_err(format, ErrorCode::DependencyMissing, &e.to_string()),
    };

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    for pane in &panes {
        match detector.detect_pane(pane).await {
            Ok(status) => {
                lines.push(format!(
                    "{:<4} {:<24} {:<8} {}",
                    pane.index, pane.title, status.family, status.state
                ));
                rows.push(serde_json::json!({
                    "pane_id": status.pane_id,
                    "index": pane.index,
                    "title": pane.title,
                    "family": status.family,
                    "state": status.state,
                    "last_activity_ms": status.last_activity_ms,
                    "preview": status.output_preview,
                }));
            }
            Err(e) => {
                lines.push(format!("{:<4} {:<24} detect failed: {}", pane.index, pane.title, e));
            }
        }
    }

    emit_ok(
        format,
        serde_json::json!({ "session": args.session, "panes": rows }),
        &lines.join("\n"),
    )
}
