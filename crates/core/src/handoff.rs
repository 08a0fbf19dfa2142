// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff record: the YAML contract between agent sessions.
//!
//! A handoff captures what a session did and what the successor should do.
//! Only `goal` and `now` are mandatory; everything else is optional and
//! omitted from YAML when empty. Enumerated fields (`status`, `outcome`,
//! `agent_type`) are kept as strings so a sloppy record still parses and
//! surfaces field-level validation issues instead of a parse failure.

use crate::clock::{date_ymd, Clock};
use crate::error::ValidationErrors;
use crate::session::is_valid_session_name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current handoff schema version.
pub const HANDOFF_VERSION: &str = "1.0";

/// Allowed `status` values (empty means unset).
pub const STATUSES: &[&str] = &["complete", "partial", "blocked"];

/// Allowed `outcome` values (empty means unset).
pub const OUTCOMES: &[&str] = &["SUCCEEDED", "PARTIAL_PLUS", "PARTIAL_MINUS", "FAILED"];

/// Agent families that write handoffs.
pub const AGENT_TYPES: &[&str] = &["cc", "cod", "gmi"];

fn default_version() -> String {
    HANDOFF_VERSION.to_string()
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// One accomplished task and the files it touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneItem {
    pub task: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// File-system deltas of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChanges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modified: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// One reservation the successor should re-acquire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub path_pattern: String,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

fn default_transfer_ttl() -> u64 {
    900
}

fn default_transfer_grace() -> u64 {
    2
}

/// Reservation-transfer instructions embedded in a handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationTransfer {
    /// Agent currently holding the reservations
    pub from: String,
    pub project_key: String,
    /// Reservation TTL for the successor, seconds
    #[serde(default = "default_transfer_ttl")]
    pub ttl: u64,
    /// Re-acquire grace on conflict, seconds
    #[serde(default = "default_transfer_grace")]
    pub grace: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reservations: Vec<TransferEntry>,
}

/// A versioned session handoff record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    #[serde(default = "default_version")]
    pub version: String,
    /// What the session set out to do (mandatory)
    pub goal: String,
    /// What the successor should do first (mandatory)
    pub now: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub outcome: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session: String,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub updated_at: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub done_this_session: Vec<DoneItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub decisions: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub findings: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worked: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
    #[serde(default, skip_serializing_if = "FileChanges::is_empty")]
    pub files: FileChanges,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_beads: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_mail_threads: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cm_memories: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pane_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tokens_used: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tokens_max: u64,
    #[serde(default)]
    pub tokens_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_transfer: Option<ReservationTransfer>,
}

fn is_ymd(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}

impl Handoff {
    pub fn new(goal: impl Into<String>, now: impl Into<String>) -> Self {
        Self {
            version: HANDOFF_VERSION.to_string(),
            goal: goal.into(),
            now: now.into(),
            ..Default::default()
        }
    }

    /// Collect every field-level issue; never stops at the first.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.goal.trim().is_empty() {
            errors.push("goal", "is required");
        }
        if self.now.trim().is_empty() {
            errors.push("now", "is required");
        }
        if !self.date.is_empty() && !is_ymd(&self.date) {
            errors.push_value("date", "must match YYYY-MM-DD", &self.date);
        }
        if !self.session.is_empty()
            && self.session != "general"
            && !is_valid_session_name(&self.session)
        {
            errors.push_value(
                "session",
                "must match [A-Za-z0-9_-]+ (or \"general\")",
                &self.session,
            );
        }
        if !self.status.is_empty() && !STATUSES.contains(&self.status.as_str()) {
            errors.push_value("status", "must be complete, partial, or blocked", &self.status);
        }
        if !self.outcome.is_empty() && !OUTCOMES.contains(&self.outcome.as_str()) {
            errors.push_value(
                "outcome",
                "must be SUCCEEDED, PARTIAL_PLUS, PARTIAL_MINUS, or FAILED",
                &self.outcome,
            );
        }
        if !self.agent_type.is_empty() && !AGENT_TYPES.contains(&self.agent_type.as_str()) {
            errors.push_value("agent_type", "must be cc, cod, or gmi", &self.agent_type);
        }
        if let Some(transfer) = &self.reservation_transfer {
            if transfer.from.trim().is_empty() {
                errors.push("reservation_transfer.from", "is required");
            }
            if transfer.project_key.trim().is_empty() {
                errors.push("reservation_transfer.project_key", "is required");
            }
            for (i, entry) in transfer.reservations.iter().enumerate() {
                if entry.path_pattern.trim().is_empty() {
                    errors.push(
                        format!("reservation_transfer.reservations[{}].path_pattern", i),
                        "is required",
                    );
                }
            }
        }
        errors
    }

    /// Fill defaults, recompute derived fields, then validate.
    ///
    /// A non-zero `created_at` is preserved; `updated_at` always moves to
    /// now; `tokens_pct` is recomputed from used/max.
    pub fn validate_and_set_defaults(&mut self, clock: &impl Clock) -> Result<(), ValidationErrors> {
        let now_ms = clock.epoch_ms();
        if self.version.is_empty() {
            self.version = HANDOFF_VERSION.to_string();
        }
        if self.date.is_empty() {
            self.date = date_ymd(now_ms);
        }
        if self.created_at == 0 {
            self.created_at = now_ms;
        }
        self.updated_at = now_ms;
        self.tokens_pct = if self.tokens_max > 0 {
            100.0 * self.tokens_used as f64 / self.tokens_max as f64
        } else {
            0.0
        };
        self.validate().into_result()
    }
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;
