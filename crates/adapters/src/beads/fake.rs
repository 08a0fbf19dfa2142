// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake triage client for testing

use super::{TriageClient, TriageError};
use async_trait::async_trait;
use muster_core::TriageRecommendation;
use parking_lot::Mutex;
use std::sync::Arc;

/// Serves a configured recommendation list.
#[derive(Clone, Default)]
pub struct FakeTriage {
    inner: Arc<Mutex<Vec<TriageRecommendation>>>,
}

impl FakeTriage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_recommendations(&self, recommendations: Vec<TriageRecommendation>) {
        *self.inner.lock() = recommendations;
    }
}

#[async_trait]
impl TriageClient for FakeTriage {
    async fn recommendations(
        &self,
        _project: &str,
    ) -> Result<Vec<TriageRecommendation>, TriageError> {
        Ok(self.inner.lock().clone())
    }
}
