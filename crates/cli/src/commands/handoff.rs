// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster handoff` - write, list, show, and inject handoffs.

use crate::output::{emit_err, emit_ok, OutputFormat};
use clap::{Args, Subcommand};
use muster_core::{ErrorCode, Handoff, SystemClock};
use muster_handoff::{
    format_handoff_context, format_minimal_handoff, HandoffStore, HandoffWriter, SessionKind,
};
use std::path::Path;

#[derive(Args)]
pub struct HandoffArgs {
    #[command(subcommand)]
    command: HandoffCommand,
}

#[derive(Subcommand)]
enum HandoffCommand {
    /// Write a handoff for a session
    Write {
        #[arg(long)]
        session: String,
        #[arg(long)]
        goal: String,
        #[arg(long)]
        now: String,
        /// complete | partial | blocked
        #[arg(long, default_value = "")]
        status: String,
        /// Mark as orchestrator-written
        #[arg(long)]
        auto: bool,
    },
    /// Show the latest handoff of a session
    Show {
        #[arg(long)]
        session: String,
    },
    /// List a session's handoffs
    List {
        #[arg(long)]
        session: String,
    },
    /// Print the recovery injection for a successor agent
    Inject {
        #[arg(long)]
        session: String,
        /// fresh | clear | compact
        #[arg(long, default_value = "fresh")]
        kind: String,
    },
}

fn parse_kind(kind: &str) -> Option<SessionKind> {
    match kind {
        "fresh" => Some(SessionKind::FreshSpawn),
        "clear" => Some(SessionKind::AfterClear),
        "compact" => Some(SessionKind::AfterCompact),
        _ => None,
    }
}

pub async fn run(args: HandoffArgs, project_dir: &Path, format: OutputFormat) -> i32 {
    let store = HandoffStore::new(project_dir);
    match args.command {
        HandoffCommand::Write {
            session,
            goal,
            now,
            status,
            auto,
        } => {
            let mut handoff = Handoff::new(goal, now);
            handoff.status = status;
            let writer = HandoffWriter::new(project_dir);
            match writer.write(handoff, &session, auto, &SystemClock) {
                Ok(path) => emit_ok(
                    format,
                    serde_json::json!({ "path": path }),
                    &format!("wrote {}", path.display()),
                ),
                Err(muster_handoff::WriteError::Validation(errors)) => {
                    emit_err(format, ErrorCode::Validation, &errors.to_string())
                }
                Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
            }
        }
        HandoffCommand::Show { session } => match store.find_latest(&session) {
            Ok(Some((path, handoff))) => {
                let text = format!(
                    "{}\n  goal: {}\n  now: {}\n  status: {}",
                    path.display(),
                    handoff.goal,
                    handoff.now,
                    if handoff.status.is_empty() { "-" } else { &handoff.status },
                );
                match serde_json::to_value(&handoff) {
                    Ok(data) => emit_ok(
                        format,
                        serde_json::json!({ "path": path, "handoff": data }),
                        &text,
                    ),
                    Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
                }
            }
            Ok(None) => emit_err(
                format,
                ErrorCode::SessionNotFound,
                &format!("no handoffs for session {}", session),
            ),
            Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
        },
        HandoffCommand::List { session } => match store.list_handoffs(&session) {
            Ok(summaries) => {
                let lines: Vec<String> = summaries
                    .iter()
                    .map(|s| {
                        let name = s
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        format!(
                            "{:<48} {:<10} {}",
                            name,
                            if s.status.is_empty() { "-" } else { &s.status },
                            s.goal,
                        )
                    })
                    .collect();
                let rows: Vec<serde_json::Value> = summaries
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "path": s.path,
                            "goal": s.goal,
                            "status": s.status,
                        })
                    })
                    .collect();
                emit_ok(
                    format,
                    serde_json::json!({ "handoffs": rows }),
                    &lines.join("\n"),
                )
            }
            Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
        },
        HandoffCommand::Inject { session, kind } => {
            let Some(kind) = parse_kind(&kind) else {
                return emit_err(
                    format,
                    ErrorCode::Validation,
                    "kind must be fresh, clear, or compact",
                );
            };
            match store.find_latest(&session) {
                Ok(Some((_, handoff))) => {
                    let injection = format_handoff_context(&handoff, kind);
                    emit_ok(
                        format,
                        serde_json::json!({
                            "injection": injection,
                            "minimal": format_minimal_handoff(&handoff),
                        }),
                        &injection,
                    )
                }
                Ok(None) => emit_err(
                    format,
                    ErrorCode::SessionNotFound,
                    &format!("no handoffs for session {}", session),
                ),
                Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
            }
        }
    }
}
