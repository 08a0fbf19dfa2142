// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff writing and archiving.

use crate::store::HANDOFF_DIR;
use muster_core::clock::compact_timestamp;
use muster_core::{Clock, Handoff, ValidationErrors};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("handoff validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML serialize error: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Write side of the handoff directory tree.
pub struct HandoffWriter {
    root: PathBuf,
}

impl HandoffWriter {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: project_dir.into().join(HANDOFF_DIR),
        }
    }

    /// Validate, default-fill, and persist a handoff for a session.
    ///
    /// `auto` marks orchestrator-written handoffs with the
    /// `auto-handoff-` filename prefix. The write goes through a temp
    /// sibling and a rename.
    pub fn write(
        &self,
        mut handoff: Handoff,
        session: &str,
        auto: bool,
        clock: &impl Clock,
    ) -> Result<PathBuf, WriteError> {
        handoff.validate_and_set_defaults(clock)?;
        if handoff.session.is_empty() {
            handoff.session = session.to_string();
        }

        let dir = self.root.join(session);
        std::fs::create_dir_all(&dir)?;
        let prefix = if auto { "auto-handoff" } else { "handoff" };
        let name = format!("{}-{}.yaml", prefix, compact_timestamp(clock.epoch_ms()));
        let path = dir.join(name);

        let yaml = serde_yaml::to_string(&handoff)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, yaml)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "handoff written");
        Ok(path)
    }

    /// Move a handoff into the session's `.archive/` sibling.
    pub fn archive(&self, path: &Path) -> Result<PathBuf, WriteError> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let archive_dir = dir.join(".archive");
        std::fs::create_dir_all(&archive_dir)?;
        let name = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("handoff.yaml"));
        let target = archive_dir.join(name);
        std::fs::rename(path, &target)?;
        Ok(target)
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
