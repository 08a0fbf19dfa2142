// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation service client.
//!
//! The server grants exclusive or shared holds on file-path patterns,
//! scoped to (project, agent) with a TTL. Conflicts come back in the
//! outcome with holder names and reservation ids so callers can wait,
//! request a transfer, or force-release.

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeReservations;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("reservation service unavailable: {0}")]
    Unavailable(String),
    #[error("reservation conflict on {}", .paths.join(", "))]
    Conflict { paths: Vec<String> },
    #[error("reservation protocol error: {0}")]
    Protocol(String),
}

/// A hold the server granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedReservation {
    pub id: String,
    pub path_pattern: String,
    pub exclusive: bool,
    pub expires_at_ms: u64,
}

/// A path that could not be reserved, with its current holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConflict {
    pub path: String,
    pub holders: Vec<String>,
    pub holder_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_since_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
}

/// Result of one reserve call; partial grants are possible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveOutcome {
    pub granted: Vec<GrantedReservation>,
    pub conflicts: Vec<ReservationConflict>,
}

impl ReserveOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Client for the reservation service.
#[async_trait]
pub trait ReservationClient: Clone + Send + Sync + 'static {
    /// Reserve `paths` for `agent`. Grants what it can; the rest come
    /// back as conflicts.
    async fn reserve(
        &self,
        project: &str,
        agent: &str,
        paths: &[String],
        ttl_s: u64,
        exclusive: bool,
        reason: &str,
    ) -> Result<ReserveOutcome, ReservationError>;

    /// Release holds by path and/or by reservation id. Ids release
    /// regardless of owner (force-release path).
    async fn release(
        &self,
        project: &str,
        agent: &str,
        paths: &[String],
        ids: &[String],
    ) -> Result<(), ReservationError>;

    /// Extend every hold of `agent` by `extend_s` from now.
    async fn renew(&self, project: &str, agent: &str, extend_s: u64)
        -> Result<(), ReservationError>;
}
