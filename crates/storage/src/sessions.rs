// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session agent roster persistence.

use crate::paths::{config_root, project_keys_match, sanitize_key};
use crate::registry::{RegistryFile, StorageError};
use muster_core::{AgentRecord, Roster, RosterError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("roster invariant violated: {0}")]
    Roster(#[from] RosterError),
}

/// On-disk form of a session's roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    session: String,
    project_key: String,
    records: Vec<AgentRecord>,
    updated_at_ms: u64,
}

/// Registry of agent rosters, one file per session.
pub struct SessionRegistry {
    session: String,
    project_key: String,
    file: RegistryFile<SessionFile>,
}

impl SessionRegistry {
    pub fn open(session: &str, project_key: &str) -> Self {
        let path = config_root()
            .join(sanitize_key(session))
            .join("agents.json");
        Self {
            session: session.to_string(),
            project_key: project_key.to_string(),
            file: RegistryFile::new(path),
        }
    }

    /// Load the roster. A missing file or a project-key mismatch reads
    /// as `None`.
    pub fn load(&self) -> Result<Option<Roster>, SessionStoreError> {
        let Some(stored) = self.file.load()? else {
            return Ok(None);
        };
        if !project_keys_match(&stored.project_key, &self.project_key) {
            tracing::debug!(
                session = %self.session,
                stored = %stored.project_key,
                requested = %self.project_key,
                "session registry belongs to another project"
            );
            return Ok(None);
        }
        Ok(Some(Roster::from_records(stored.records)?))
    }

    pub fn save(&self, roster: &Roster, updated_at_ms: u64) -> Result<(), SessionStoreError> {
        self.file.save(&SessionFile {
            session: self.session.clone(),
            project_key: self.project_key.clone(),
            records: roster.to_records(),
            updated_at_ms,
        })?;
        Ok(())
    }

    /// Remove the registry on session teardown.
    pub fn delete(&self) -> Result<(), SessionStoreError> {
        self.file.delete()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
