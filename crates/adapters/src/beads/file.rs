// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed triage client.
//!
//! Reads a triage export (`bd triage --json > triage.json`) instead of
//! talking to a live beads server.

use super::{TriageClient, TriageError};
use async_trait::async_trait;
use muster_core::TriageRecommendation;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct FileTriage {
    path: PathBuf,
}

impl FileTriage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TriageClient for FileTriage {
    async fn recommendations(
        &self,
        _project: &str,
    ) -> Result<Vec<TriageRecommendation>, TriageError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TriageError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| TriageError::Unavailable(format!("{}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_a_triage_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.json");
        std::fs::write(
            &path,
            r#"[{"bead_id": "bd-1", "title": "fix it", "priority": 1, "score": 0.8}]"#,
        )
        .unwrap();
        let triage = FileTriage::new(&path);
        let recs = triage.recommendations("proj").await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].bead_id.as_str(), "bd-1");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let triage = FileTriage::new("/definitely/not/here.json");
        assert!(matches!(
            triage.recommendations("proj").await,
            Err(TriageError::Unavailable(_))
        ));
    }
}
