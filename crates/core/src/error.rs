// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the workspace.
//!
//! Every failed operation maps to a stable machine code plus a human hint.
//! Crate-local error enums implement `code()` against this taxonomy; the
//! CLI renders the code into its JSON envelope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable machine codes for failed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    DependencyMissing,
    SessionNotFound,
    PaneNotFound,
    BeadNotFound,
    ReservationConflict,
    /// Transfer partial failure: released but not re-acquired
    ReservationLost,
    Timeout,
    Cancelled,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "validation",
            ErrorCode::DependencyMissing => "dependency_missing",
            ErrorCode::SessionNotFound => "session_not_found",
            ErrorCode::PaneNotFound => "pane_not_found",
            ErrorCode::BeadNotFound => "bead_not_found",
            ErrorCode::ReservationConflict => "reservation_conflict",
            ErrorCode::ReservationLost => "reservation_released_but_not_reacquired",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Internal => "internal",
        }
    }

    /// Short remediation hint for human output.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ErrorCode::DependencyMissing => {
                Some("check that the multiplexer, mail, and beads services are running")
            }
            ErrorCode::ReservationConflict => {
                Some("another agent holds the files; wait, request a transfer, or force-release")
            }
            ErrorCode::ReservationLost => {
                Some("reservations were released but not re-acquired; inspect the transfer report")
            }
            ErrorCode::Timeout => Some("increase the stage timeout or check the agent pane"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}: {} (got {:?})", self.field, self.message, v),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Aggregator that collects every field error, not just the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            value: None,
        });
    }

    pub fn push_value(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            value: Some(value.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Ok when no issues were collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no validation issues");
        }
        let rendered: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_issues() {
        let mut errors = ValidationErrors::new();
        errors.push("goal", "is required");
        errors.push_value("date", "must match YYYY-MM-DD", "tomorrow");
        assert_eq!(errors.len(), 2);
        let rendered = errors.to_string();
        assert!(rendered.contains("goal: is required"));
        assert!(rendered.contains("tomorrow"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Validation.as_str(), "validation");
        assert_eq!(
            ErrorCode::ReservationLost.as_str(),
            "reservation_released_but_not_reacquired"
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::DependencyMissing).unwrap(),
            "\"dependency_missing\""
        );
    }
}
