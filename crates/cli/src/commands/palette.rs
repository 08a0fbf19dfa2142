// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster palette` - recently used commands.

use crate::output::{emit_err, emit_ok, OutputFormat};
use clap::{Args, Subcommand};
use muster_core::{Clock, ErrorCode, SystemClock};
use muster_storage::PaletteRegistry;

#[derive(Args)]
pub struct PaletteArgs {
    #[command(subcommand)]
    command: PaletteCommand,
}

#[derive(Subcommand)]
enum PaletteCommand {
    /// Show palette entries, most recent first
    List,
    /// Record a command use
    Record {
        #[arg(long)]
        label: String,
        #[arg(long)]
        command: String,
    },
}

pub fn run(args: PaletteArgs, format: OutputFormat) -> i32 {
    let palette = PaletteRegistry::open();
    match args.command {
        PaletteCommand::List => match palette.list() {
            Ok(entries) => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{:<28} {:<5} {}", e.label, e.use_count, e.command))
                    .collect();
                let rows: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "label": e.label,
                            "command": e.command,
                            "use_count": e.use_count,
                            "last_used_ms": e.last_used_ms,
                        })
                    })
                    .collect();
                let text = if lines.is_empty() {
                    "palette is empty".to_string()
                } else {
                    lines.join("\n")
                };
                emit_ok(format, serde_json::json!({ "entries": rows }), &text)
            }
            Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
        },
        PaletteCommand::Record { label, command } => {
            match palette.record_use(&label, &command, SystemClock.epoch_ms()) {
                Ok(()) => emit_ok(
                    format,
                    serde_json::json!({ "recorded": command }),
                    &format!("recorded {}", label),
                ),
                Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
            }
        }
    }
}
