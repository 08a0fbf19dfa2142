// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assignment persistence, one file per session.

use crate::paths::{config_root, project_keys_match, sanitize_key};
use crate::registry::{RegistryFile, StorageError};
use muster_core::{Assignment, AssignmentError, AssignmentStatus, BeadId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from assignment status operations.
#[derive(Debug, Error)]
pub enum AssignmentStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no assignment stored for bead: {0}")]
    NotFound(BeadId),
    #[error(transparent)]
    Transition(#[from] AssignmentError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AssignmentFile {
    project_key: String,
    assignments: Vec<Assignment>,
}

/// Registry of a session's assignments.
pub struct AssignmentRegistry {
    project_key: String,
    file: RegistryFile<AssignmentFile>,
}

impl AssignmentRegistry {
    pub fn open(session: &str, project_key: &str) -> Self {
        let path = config_root()
            .join(sanitize_key(session))
            .join("assignments.json");
        Self {
            project_key: project_key.to_string(),
            file: RegistryFile::new(path),
        }
    }

    /// All stored assignments; a project-key mismatch reads as empty.
    pub fn list(&self) -> Result<Vec<Assignment>, StorageError> {
        let Some(stored) = self.file.load()? else {
            return Ok(Vec::new());
        };
        if !project_keys_match(&stored.project_key, &self.project_key) {
            return Ok(Vec::new());
        }
        Ok(stored.assignments)
    }

    /// Insert or replace the assignment for a bead.
    pub fn upsert(&self, assignment: Assignment) -> Result<(), StorageError> {
        let mut assignments = self.list()?;
        match assignments
            .iter_mut()
            .find(|a| a.bead_id == assignment.bead_id)
        {
            Some(existing) => *existing = assignment,
            None => assignments.push(assignment),
        }
        self.file.save(&AssignmentFile {
            project_key: self.project_key.clone(),
            assignments,
        })
    }

    pub fn find(&self, bead_id: &BeadId) -> Result<Option<Assignment>, StorageError> {
        Ok(self.list()?.into_iter().find(|a| &a.bead_id == bead_id))
    }

    /// Transition a stored assignment to a new status.
    pub fn transition(
        &self,
        bead_id: &BeadId,
        to: AssignmentStatus,
    ) -> Result<Assignment, AssignmentStoreError> {
        let mut assignment = self
            .find(bead_id)?
            .ok_or_else(|| AssignmentStoreError::NotFound(bead_id.clone()))?;
        assignment.transition(to)?;
        self.upsert(assignment.clone())?;
        Ok(assignment)
    }

    /// Mark a stored assignment failed: bumps the retry count and keeps
    /// the reason for the next attempt.
    pub fn record_failure(
        &self,
        bead_id: &BeadId,
        reason: &str,
    ) -> Result<Assignment, AssignmentStoreError> {
        let mut assignment = self
            .find(bead_id)?
            .ok_or_else(|| AssignmentStoreError::NotFound(bead_id.clone()))?;
        assignment.fail(reason)?;
        self.upsert(assignment.clone())?;
        Ok(assignment)
    }

    /// Open (non-terminal) assignments per agent name, for load tracking.
    pub fn open_count_for(&self, agent_name: &str) -> Result<usize, StorageError> {
        Ok(self
            .list()?
            .iter()
            .filter(|a| a.agent_name == agent_name && !a.status.is_terminal())
            .count())
    }

    /// Drop terminal assignments, keeping the file small.
    pub fn prune_terminal(&self) -> Result<usize, StorageError> {
        let mut assignments = self.list()?;
        let before = assignments.len();
        assignments.retain(|a| !matches!(
            a.status,
            AssignmentStatus::Completed | AssignmentStatus::Reassigned
        ));
        let pruned = before - assignments.len();
        if pruned > 0 {
            self.file.save(&AssignmentFile {
                project_key: self.project_key.clone(),
                assignments,
            })?;
        }
        Ok(pruned)
    }
}

#[cfg(test)]
#[path = "assignments_tests.rs"]
mod tests;
