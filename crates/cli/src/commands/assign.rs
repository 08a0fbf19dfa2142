// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster assign` / `muster suggest` - work assignment.
//!
//! Triage comes from a beads export file; dispatch mail falls back to
//! the no-op client when no mail server is configured.

use crate::output::{emit_err, emit_ok, OutputFormat};
use clap::{Args, Subcommand};
use muster_adapters::{
    EventSender, FileTriage, MuxClient, NoopMail, TmuxMux, TriageError,
};
use muster_assign::{
    AgentCandidate, AgentProfile, Coordinator, CoordinatorConfig, Strategy,
};
use muster_assign::coordinator::CoordinatorError;
use muster_core::{BeadId, ErrorCode, PaneTitle, SystemClock};
use muster_detect::{DetectorConfig, PatternTable, StateDetector};
use muster_storage::{AssignmentRegistry, AssignmentStoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct AssignArgs {
    #[command(subcommand)]
    command: AssignCommand,
}

#[derive(Subcommand)]
enum AssignCommand {
    /// Score the triage pool and dispatch to idle agents
    Work {
        /// Session whose agents take the work
        #[arg(long)]
        session: String,
        /// Triage export file (`bd triage --json`)
        #[arg(long, default_value = "triage.json")]
        recommendations: PathBuf,
        /// Matching strategy
        #[arg(long, default_value = "balanced")]
        strategy: String,
    },
    /// Mark a bead's assignment failed
    MarkFailed {
        #[arg(long)]
        session: String,
        #[arg(long)]
        bead: String,
        #[arg(long)]
        reason: String,
    },
    /// Move a failed or stuck assignment to another idle agent
    Reassign {
        #[arg(long)]
        session: String,
        #[arg(long)]
        bead: String,
    },
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Session to look in
    #[arg(long)]
    pub session: String,
    /// Pane index of the agent to advise
    #[arg(long)]
    pub pane: u32,
    /// Triage export file
    #[arg(long, default_value = "triage.json")]
    pub recommendations: PathBuf,
}

async fn candidates(session: &str) -> Result<Vec<AgentCandidate>, String> {
    let mux = TmuxMux::new();
    let detector = StateDetector::new(
        mux.clone(),
        Arc::new(PatternTable::new()),
        DetectorConfig::default(),
        Arc::new(SystemClock),
    );
    let panes = mux
        .list_panes(session)
        .await
        .map_err(|e| e.to_string())?;

    let mut candidates = Vec::new();
    for pane in &panes {
        let Some(title) = PaneTitle::parse(&pane.title) else {
            continue;
        };
        if !title.family.is_agent() {
            continue;
        }
        let status = detector
            .detect_pane(pane)
            .await
            .map_err(|e| e.to_string())?;
        candidates.push(AgentCandidate {
            pane_id: pane.id.clone(),
            pane_index: pane.index,
            name: pane.title.clone(),
            family: title.family,
            state: status.state,
            context_pct: 0.0,
            active_reservations: 0,
            existing_assignments: 0,
            last_assigned_at_ms: 0,
            profile: AgentProfile::for_family(title.family),
        });
    }
    Ok(candidates)
}

fn coordinator(
    session: &str,
    project_dir: &Path,
    strategy: Strategy,
    recommendations: &Path,
) -> Coordinator<NoopMail, FileTriage, SystemClock> {
    let project_key = project_dir.to_string_lossy().to_string();
    let mut config = CoordinatorConfig::new(&project_key, &project_key, session);
    config.strategy = strategy;
    let (events, _rx) = EventSender::channel(64);
    Coordinator::new(
        config,
        NoopMail::new(),
        FileTriage::new(recommendations),
        Arc::new(SystemClock),
        events,
    )
}

pub async fn run_assign(args: AssignArgs, project_dir: &Path, format: OutputFormat) -> i32 {
    match args.command {
        AssignCommand::Work {
            session,
            recommendations,
            strategy,
        } => run_work(&session, &recommendations, &strategy, project_dir, format).await,
        AssignCommand::MarkFailed {
            session,
            bead,
            reason,
        } => run_mark_failed(&session, &bead, &reason, project_dir, format),
        AssignCommand::Reassign { session, bead } => {
            run_reassign(&session, &bead, project_dir, format).await
        }
    }
}

async fn run_work(
    session: &str,
    recommendations: &Path,
    strategy: &str,
    project_dir: &Path,
    format: OutputFormat,
) -> i32 {
    let strategy: Strategy = match strategy.parse() {
        Ok(strategy) => strategy,
        Err(e) => return emit_err(format, ErrorCode::Validation, &format!("{}", e)),
    };
    let agents = match candidates(session).await {
        Ok(agents) => agents,
        Err(e) => return emit_err(format, ErrorCode::DependencyMissing, &e),
    };

    let mut coordinator = coordinator(session, project_dir, strategy, recommendations);
    if let Err(e) = coordinator.refresh_recommendations().await {
        let code = match &e {
            CoordinatorError::Triage(TriageError::NotFound(_)) => ErrorCode::BeadNotFound,
            _ => ErrorCode::DependencyMissing,
        };
        return emit_err(format, code, &e.to_string());
    }

    let placed = coordinator.assign_work(&agents).await;
    let lines: Vec<String> = placed
        .iter()
        .map(|a| {
            format!(
                "{} -> {} (pane {}, score {:.2}): {}",
                a.bead_id, a.agent_name, a.pane_index, a.score, a.reason
            )
        })
        .collect();
    let text = if lines.is_empty() {
        "no assignable work".to_string()
    } else {
        lines.join("\n")
    };
    match serde_json::to_value(&placed) {
        Ok(data) => emit_ok(format, serde_json::json!({ "assignments": data }), &text),
        Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
    }
}

fn run_mark_failed(
    session: &str,
    bead: &str,
    reason: &str,
    project_dir: &Path,
    format: OutputFormat,
) -> i32 {
    let project_key = project_dir.to_string_lossy();
    let registry = AssignmentRegistry::open(session, &project_key);
    match registry.record_failure(&BeadId::new(bead), reason) {
        Ok(failed) => emit_ok(
            format,
            serde_json::json!({
                "bead_id": failed.bead_id,
                "status": failed.status,
                "retry_count": failed.retry_count,
                "reason": failed.previous_fail_reason,
            }),
            &format!(
                "{} marked failed (attempt {}): {}",
                failed.bead_id, failed.retry_count, reason
            ),
        ),
        Err(AssignmentStoreError::NotFound(bead_id)) => emit_err(
            format,
            ErrorCode::BeadNotFound,
            &format!("no assignment stored for bead {}", bead_id),
        ),
        Err(AssignmentStoreError::Transition(e)) => {
            emit_err(format, ErrorCode::Validation, &e.to_string())
        }
        Err(e) => emit_err(format, ErrorCode::Internal, &e.to_string()),
    }
}

async fn run_reassign(session: &str, bead: &str, project_dir: &Path, format: OutputFormat) -> i32 {
    let agents = match candidates(session).await {
        Ok(agents) => agents,
        Err(e) => return emit_err(format, ErrorCode::DependencyMissing, &e),
    };
    let coordinator = coordinator(
        session,
        project_dir,
        Strategy::Balanced,
        Path::new("triage.json"),
    );
    match coordinator.reassign(&BeadId::new(bead), &agents).await {
        Ok(successor) => emit_ok(
            format,
            serde_json::json!({
                "bead_id": successor.bead_id,
                "agent_name": successor.agent_name,
                "pane_index": successor.pane_index,
                "retry_count": successor.retry_count,
                "previous_agent": successor.previous_agent,
                "previous_fail_reason": successor.previous_fail_reason,
            }),
            &format!(
                "{} -> {} (pane {}, attempt {})",
                successor.bead_id, successor.agent_name, successor.pane_index, successor.retry_count
            ),
        ),
        Err(CoordinatorError::Store(AssignmentStoreError::NotFound(bead_id))) => emit_err(
            format,
            ErrorCode::BeadNotFound,
            &format!("no assignment stored for bead {}", bead_id),
        ),
        Err(CoordinatorError::Store(AssignmentStoreError::Transition(e))) => {
            emit_err(format, ErrorCode::Validation, &e.to_string())
        }
        Err(CoordinatorError::NoEligibleAgent(bead_id)) => emit_err(
            format,
            ErrorCode::PaneNotFound,
            &format!("no other idle agent pane can take bead {}", bead_id),
        ),
        Err(e) => emit_err(format, ErrorCode::DependencyMissing, &e.to_string()),
    }
}

pub async fn run_suggest(args: SuggestArgs, project_dir: &Path, format: OutputFormat) -> i32 {
    let agents = match candidates(&args.session).await {
        Ok(agents) => agents,
        Err(e) => return emit_err(format, ErrorCode::DependencyMissing, &e),
    };
    let Some(agent) = agents.iter().find(|a| a.pane_index == args.pane) else {
        return emit_err(
            format,
            ErrorCode::PaneNotFound,
            &format!("no agent pane with index {}", args.pane),
        );
    };

    let mut coordinator = coordinator(
        &args.session,
        project_dir,
        Strategy::Balanced,
        &args.recommendations,
    );
    if let Err(e) = coordinator.refresh_recommendations().await {
        return emit_err(format, ErrorCode::DependencyMissing, &e.to_string());
    }

    match coordinator.suggest_assignment(agent) {
        Some(suggestion) => emit_ok(
            format,
            serde_json::json!({
                "bead_id": suggestion.bead_id,
                "title": suggestion.title,
                "score": suggestion.score,
                "confidence": suggestion.confidence,
                "reason": suggestion.reason,
            }),
            &format!(
                "{}: {} (score {:.2}, {})",
                suggestion.bead_id, suggestion.title, suggestion.score, suggestion.reason
            ),
        ),
        None => emit_ok(
            format,
            serde_json::json!({ "suggestion": null }),
            "no assignable work",
        ),
    }
}
