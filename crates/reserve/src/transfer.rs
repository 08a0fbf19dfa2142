// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation transfer between agents.
//!
//! Release from the predecessor, reserve for the successor, one graced
//! retry, rollback to the predecessor when the successor cannot take
//! everything. The report always describes the end state: `granted` and
//! `released` are meaningful even on failure.

use muster_adapters::{ReservationClient, ReservationConflict, ReservationError};
use muster_core::ErrorCode;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Default TTL applied to transferred reservations, seconds.
pub const DEFAULT_TRANSFER_TTL_S: u64 = 900;

/// Default grace before the single retry, seconds.
pub const DEFAULT_TRANSFER_GRACE_S: u64 = 2;

/// One reservation to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSpec {
    pub path: String,
    pub exclusive: bool,
}

/// A transfer request.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub project: String,
    pub from_agent: String,
    pub to_agent: String,
    pub reservations: Vec<TransferSpec>,
    pub ttl_s: u64,
    pub grace: Duration,
}

impl TransferRequest {
    pub fn new(project: &str, from: &str, to: &str, reservations: Vec<TransferSpec>) -> Self {
        Self {
            project: project.to_string(),
            from_agent: from.to_string(),
            to_agent: to.to_string(),
            reservations,
            ttl_s: DEFAULT_TRANSFER_TTL_S,
            grace: Duration::from_secs(DEFAULT_TRANSFER_GRACE_S),
        }
    }
}

/// What a transfer did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    pub requested: Vec<String>,
    pub released: Vec<String>,
    pub granted: Vec<String>,
    pub conflicts: Vec<ReservationConflict>,
    pub rolled_back: bool,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid transfer request: {field} is empty")]
    InvalidRequest { field: &'static str },
    #[error("transfer cancelled")]
    Cancelled,
    #[error("reservation service: {0}")]
    Service(#[from] ReservationError),
}

impl TransferError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TransferError::InvalidRequest { .. } => ErrorCode::Validation,
            TransferError::Cancelled => ErrorCode::Cancelled,
            TransferError::Service(_) => ErrorCode::DependencyMissing,
        }
    }
}

/// Deduplicate and split the request into exclusive and shared groups;
/// exclusive wins when the same path appears both ways. Both groups come
/// back sorted.
fn split_reservations(reservations: &[TransferSpec]) -> (Vec<String>, Vec<String>) {
    let mut merged: BTreeMap<String, bool> = BTreeMap::new();
    for spec in reservations {
        let entry = merged.entry(spec.path.clone()).or_insert(false);
        *entry |= spec.exclusive;
    }
    let mut exclusive = Vec::new();
    let mut shared = Vec::new();
    for (path, is_exclusive) in merged {
        if is_exclusive {
            exclusive.push(path);
        } else {
            shared.push(path);
        }
    }
    (exclusive, shared)
}

struct ReserveAllOutcome {
    granted: Vec<String>,
    conflicts: Vec<ReservationConflict>,
}

/// Reserve the exclusive and shared groups in separate calls. A conflict
/// in the exclusive group aborts before the shared call; `granted` always
/// reflects what actually stuck so callers can undo it.
async fn reserve_all<R: ReservationClient>(
    client: &R,
    project: &str,
    agent: &str,
    exclusive: &[String],
    shared: &[String],
    ttl_s: u64,
    reason: &str,
) -> Result<ReserveAllOutcome, TransferError> {
    let mut granted = Vec::new();
    let mut conflicts = Vec::new();

    if !exclusive.is_empty() {
        let outcome = client
            .reserve(project, agent, exclusive, ttl_s, true, reason)
            .await?;
        granted.extend(outcome.granted.into_iter().map(|g| g.path_pattern));
        if !outcome.conflicts.is_empty() {
            conflicts.extend(outcome.conflicts);
            return Ok(ReserveAllOutcome { granted, conflicts });
        }
    }
    if !shared.is_empty() {
        let outcome = client
            .reserve(project, agent, shared, ttl_s, false, reason)
            .await?;
        granted.extend(outcome.granted.into_iter().map(|g| g.path_pattern));
        conflicts.extend(outcome.conflicts);
    }
    Ok(ReserveAllOutcome { granted, conflicts })
}

/// Move reservations from one agent to another.
///
/// `from == to` degenerates to a TTL renewal with no release and no
/// reserve. Cancellation during the grace wait surfaces as
/// [`TransferError::Cancelled`].
pub async fn transfer_reservations<R: ReservationClient>(
    client: &R,
    request: &TransferRequest,
    cancel: &CancellationToken,
) -> Result<TransferReport, TransferError> {
    if request.project.trim().is_empty() {
        return Err(TransferError::InvalidRequest { field: "project" });
    }
    if request.from_agent.trim().is_empty() {
        return Err(TransferError::InvalidRequest { field: "from_agent" });
    }
    if request.to_agent.trim().is_empty() {
        return Err(TransferError::InvalidRequest { field: "to_agent" });
    }

    let (exclusive, shared) = split_reservations(&request.reservations);
    let requested: Vec<String> = exclusive.iter().chain(shared.iter()).cloned().collect();
    let project = request.project.as_str();

    if request.from_agent == request.to_agent {
        client
            .renew(project, &request.to_agent, request.ttl_s)
            .await?;
        return Ok(TransferReport {
            granted: requested.clone(),
            requested,
            success: true,
            ..Default::default()
        });
    }

    client
        .release(project, &request.from_agent, &requested, &[])
        .await?;
    let released = requested.clone();

    let reason = format!("transferred from {}", request.from_agent);
    let mut outcome = reserve_all(
        client,
        project,
        &request.to_agent,
        &exclusive,
        &shared,
        request.ttl_s,
        &reason,
    )
    .await?;

    if !outcome.conflicts.is_empty() && !request.grace.is_zero() {
        // Undo the partial grant, give holders the grace window, retry once
        client
            .release(project, &request.to_agent, &outcome.granted, &[])
            .await?;
        tokio::select! {
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            _ = tokio::time::sleep(request.grace) => {}
        }
        outcome = reserve_all(
            client,
            project,
            &request.to_agent,
            &exclusive,
            &shared,
            request.ttl_s,
            &reason,
        )
        .await?;
    }

    if !outcome.conflicts.is_empty() {
        // Roll the whole set back to the predecessor
        client
            .release(project, &request.to_agent, &outcome.granted, &[])
            .await?;
        let rollback_reason = format!("rollback of transfer to {}", request.to_agent);
        match reserve_all(
            client,
            project,
            &request.from_agent,
            &exclusive,
            &shared,
            request.ttl_s,
            &rollback_reason,
        )
        .await
        {
            Ok(rollback) if rollback.conflicts.is_empty() => {}
            Ok(rollback) => {
                tracing::warn!(
                    from = %request.from_agent,
                    conflicts = rollback.conflicts.len(),
                    "rollback could not re-acquire every reservation"
                );
            }
            Err(e) => {
                tracing::warn!(from = %request.from_agent, error = %e, "rollback failed");
            }
        }
        return Ok(TransferReport {
            requested,
            released,
            granted: Vec::new(),
            conflicts: outcome.conflicts,
            rolled_back: true,
            success: false,
            error: Some("reservation conflict, rolled back".to_string()),
        });
    }

    Ok(TransferReport {
        requested,
        released,
        granted: outcome.granted,
        conflicts: Vec::new(),
        rolled_back: false,
        success: true,
        error: None,
    })
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;
