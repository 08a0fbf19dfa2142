// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Beads triage client.

mod file;

pub use file::FileTriage;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTriage;

use async_trait::async_trait;
use muster_core::TriageRecommendation;
use thiserror::Error;

/// Errors from the beads service.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("beads service unavailable: {0}")]
    Unavailable(String),
    #[error("bead not found: {0}")]
    NotFound(String),
}

/// Client for the beads triage endpoint.
#[async_trait]
pub trait TriageClient: Clone + Send + Sync + 'static {
    /// Ranked recommendations for a project, best first.
    async fn recommendations(
        &self,
        project: &str,
    ) -> Result<Vec<TriageRecommendation>, TriageError>;
}
