// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster workflow` - template validation and run inspection.

use crate::output::{emit_err, emit_ok, OutputFormat};
use clap::{Args, Subcommand};
use muster_core::ErrorCode;
use muster_workflow::{PipelineRegistry, TemplateError, WorkflowTemplate};
use std::path::PathBuf;

#[derive(Args)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    command: WorkflowCommand,
}

#[derive(Subcommand)]
enum WorkflowCommand {
    /// Parse and validate a workflow template
    Validate {
        /// Template YAML file
        file: PathBuf,
    },
    /// List registered pipeline runs
    Runs,
}

pub async fn run(args: WorkflowArgs, format: OutputFormat) -> i32 {
    match args.command {
        WorkflowCommand::Validate { file } => {
            let raw = match std::fs::read_to_string(&file) {
                Ok(raw) => raw,
                Err(e) => {
                    return emit_err(
                        format,
                        ErrorCode::Validation,
                        &format!("{}: {}", file.display(), e),
                    );
                }
            };
            match WorkflowTemplate::from_yaml(&raw) {
                Ok(template) => emit_ok(
                    format,
                    serde_json::json!({
                        "name": template.name,
                        "agents": template.agents.len(),
                        "stages": template.flow.stages,
                    }),
                    &format!("{} is valid", template.name),
                ),
                Err(TemplateError::Parse(e)) => {
                    emit_err(format, ErrorCode::Validation, &e.to_string())
                }
                Err(TemplateError::Invalid(errors)) => {
                    emit_err(format, ErrorCode::Validation, &errors.to_string())
                }
            }
        }
        WorkflowCommand::Runs => {
            let runs = PipelineRegistry::global().list();
            let lines: Vec<String> = runs
                .iter()
                .map(|r| {
                    let progress = r.progress();
                    format!(
                        "{:<12} {:<20} {:?} {}%",
                        r.run_id, r.workflow_id, r.status, progress.percent
                    )
                })
                .collect();
            let rows: Vec<serde_json::Value> = runs
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "run_id": r.run_id,
                        "workflow_id": r.workflow_id,
                        "status": r.status,
                        "progress": r.progress(),
                    })
                })
                .collect();
            let text = if lines.is_empty() {
                "no registered runs".to_string()
            } else {
                lines.join("\n")
            };
            emit_ok(format, serde_json::json!({ "runs": rows }), &text)
        }
    }
}
