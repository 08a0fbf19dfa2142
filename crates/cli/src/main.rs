// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! muster - fleet orchestrator CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::{assign, handoff, palette, reserve, status, workflow};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "muster",
    version,
    about = "Muster - drive a fleet of coding agents in your multiplexer"
)]
struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long = "project-dir", global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-pane agent states for a session
    Status(status::StatusArgs),
    /// Assignment management: dispatch, mark-failed, reassign
    Assign(assign::AssignArgs),
    /// Suggest the best bead for one pane, without dispatching
    Suggest(assign::SuggestArgs),
    /// Handoff management
    Handoff(handoff::HandoffArgs),
    /// Reservation management
    Reserve(reserve::ReserveArgs),
    /// Workflow management
    Workflow(workflow::WorkflowArgs),
    /// Command palette
    Palette(palette::PaletteArgs),
}

fn project_dir(cli: &Cli) -> PathBuf {
    cli.project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MUSTER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dir = project_dir(&cli);
    let format = cli.output;

    let code = match cli.command {
        Commands::Status(args) => status::run(args, format).await,
        Commands::Assign(args) => assign::run_assign(args, &dir, format).await,
        Commands::Suggest(args) => assign::run_suggest(args, &dir, format).await,
        Commands::Handoff(args) => handoff::run(args, &dir, format).await,
        Commands::Reserve(args) => reserve::run(args, &dir, format).await,
        Commands::Workflow(args) => workflow::run(args, format).await,
        Commands::Palette(args) => palette::run(args, format),
    };
    std::process::exit(code);
}
