// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster reserve` - reservation transfer driven by the latest handoff.

use crate::output::{emit_err, OutputFormat};
use clap::{Args, Subcommand};
use muster_core::ErrorCode;
use muster_handoff::HandoffStore;
use std::path::Path;

#[derive(Args)]
pub struct ReserveArgs {
    #[command(subcommand)]
    command: ReserveCommand,
}

#[derive(Subcommand)]
enum ReserveCommand {
    /// Transfer the latest handoff's reservations to a successor agent
    Transfer {
        #[arg(long)]
        session: String,
        /// Receiving agent name
        #[arg(long)]
        to: String,
    },
}

pub async fn run(args: ReserveArgs, project_dir: &Path, format: OutputFormat) -> i32 {
    match args.command {
        ReserveCommand::Transfer { session, to } => {
            let store = HandoffStore::new(project_dir);
            let transfer = match store.find_latest(&session) {
                Ok(Some((_, handoff))) => handoff.reservation_transfer,
                Ok(None) => {
                    return emit_err(
                        format,
                        ErrorCode::SessionNotFound,
                        &format!("no handoffs for session {}", session),
                    );
                }
                Err(e) => return emit_err(format, ErrorCode::Internal, &e.to_string()),
            };
            let Some(transfer) = transfer else {
                return emit_err(
                    format,
                    ErrorCode::Validation,
                    "latest handoff carries no reservation_transfer block",
                );
            };
            // The transfer protocol itself lives in muster-reserve; the
            // live client needs the reservation server endpoint.
            let _ = (transfer, to);
            emit_err(
                format,
                ErrorCode::DependencyMissing,
                "no reservation service configured (set MUSTER_RESERVATION_URL)",
            )
        }
    }
}
