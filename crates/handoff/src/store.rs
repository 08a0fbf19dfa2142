// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff reading.
//!
//! Layout: `<project>/.ntm/handoffs/<session>/<file>.yaml`. Filenames
//! embed a timestamp and sort lexicographically; the `auto-handoff-`
//! prefix is informational. The sibling `.archive/` directory (and any
//! other dot-entry) is skipped.

use muster_core::{Handoff, HANDOFF_VERSION};
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Subdirectory of a project holding handoffs.
pub const HANDOFF_DIR: &str = ".ntm/handoffs";

/// Default freshness window of the goal/now cache.
pub const CACHE_TTL: Duration = Duration::from_secs(30);

#[allow(clippy::expect_used)]
static GOAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^goal:\s*["']?(.+?)["']?\s*$"#).expect("constant pattern is valid")
});
#[allow(clippy::expect_used)]
static NOW_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^now:\s*["']?(.+?)["']?\s*$"#).expect("constant pattern is valid")
});
#[allow(clippy::expect_used)]
static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^status:\s*["']?(.+?)["']?\s*$"#).expect("constant pattern is valid")
});

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// One handoff as listed, without a full parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffSummary {
    pub path: PathBuf,
    pub goal: String,
    pub status: String,
    pub modified: SystemTime,
}

#[derive(Debug, Clone)]
struct CachedGoalNow {
    goal: String,
    now: String,
    modified: SystemTime,
    cached_at: SystemTime,
}

/// Read side of the handoff directory tree.
pub struct HandoffStore {
    root: PathBuf,
    cache_ttl: Duration,
    cache: RwLock<HashMap<PathBuf, CachedGoalNow>>,
}

impl HandoffStore {
    /// A store rooted at a project directory.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: project_dir.into().join(HANDOFF_DIR),
            cache_ttl: CACHE_TTL,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn session_dir(&self, session: &str) -> PathBuf {
        self.root.join(session)
    }

    /// Latest handoff of a session. A missing directory is `None`, not
    /// an error.
    pub fn find_latest(&self, session: &str) -> Result<Option<(PathBuf, Handoff)>, StoreError> {
        let Some(path) = self.latest_path(session)? else {
            return Ok(None);
        };
        let handoff = self.read(&path)?;
        Ok(Some((path, handoff)))
    }

    /// Across all sessions, the handoff with the greatest `created_at`.
    pub fn find_latest_any(&self) -> Result<Option<(PathBuf, Handoff)>, StoreError> {
        let mut best: Option<(PathBuf, Handoff)> = None;
        for session in self.list_sessions()? {
            if let Some((path, handoff)) = self.find_latest(&session)? {
                let newer = best
                    .as_ref()
                    .map(|(_, b)| handoff.created_at > b.created_at)
                    .unwrap_or(true);
                if newer {
                    best = Some((path, handoff));
                }
            }
        }
        Ok(best)
    }

    /// Parse one handoff file. Validation issues are logged and the
    /// record is returned anyway; only unreadable YAML is an error.
    pub fn read(&self, path: &Path) -> Result<Handoff, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let handoff: Handoff = serde_yaml::from_str(&raw).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if handoff.version != HANDOFF_VERSION {
            tracing::debug!(path = %path.display(), version = %handoff.version, "older handoff version accepted");
        }
        let issues = handoff.validate();
        if !issues.is_empty() {
            tracing::warn!(path = %path.display(), %issues, "handoff has validation issues");
        }
        Ok(handoff)
    }

    /// Regex-only fast path for (goal, now) of a session's latest
    /// handoff, cached by file mod time.
    pub fn extract_goal_now(&self, session: &str) -> Result<Option<(String, String)>, StoreError> {
        let Some(path) = self.latest_path(session)? else {
            return Ok(None);
        };
        let modified = std::fs::metadata(&path)?.modified()?;
        let now = SystemTime::now();

        if let Some(cached) = self.cache.read().get(&path) {
            let fresh = now
                .duration_since(cached.cached_at)
                .map(|age| age < self.cache_ttl)
                .unwrap_or(false);
            if fresh && cached.modified == modified {
                return Ok(Some((cached.goal.clone(), cached.now.clone())));
            }
        }

        let raw = std::fs::read_to_string(&path)?;
        let goal = GOAL_LINE
            .captures(&raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let task = NOW_LINE
            .captures(&raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        self.cache.write().insert(
            path,
            CachedGoalNow {
                goal: goal.clone(),
                now: task.clone(),
                modified,
                cached_at: now,
            },
        );
        Ok(Some((goal, task)))
    }

    /// Drop cached goal/now entries, all of them or one path's.
    pub fn invalidate_cache(&self, path: Option<&Path>) {
        match path {
            Some(path) => {
                self.cache.write().remove(path);
            }
            None => self.cache.write().clear(),
        }
    }

    /// Summaries of a session's handoffs, newest mod time first.
    pub fn list_handoffs(&self, session: &str) -> Result<Vec<HandoffSummary>, StoreError> {
        let mut summaries = Vec::new();
        for path in self.yaml_files(session)? {
            let raw = std::fs::read_to_string(&path)?;
            let modified = std::fs::metadata(&path)?.modified()?;
            let grab = |re: &Regex| {
                re.captures(&raw)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            };
            summaries.push(HandoffSummary {
                path,
                goal: grab(&GOAL_LINE),
                status: grab(&STATUS_LINE),
                modified,
            });
        }
        summaries.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(summaries)
    }

    /// Session names, sorted; dot-entries (`.archive`) are skipped.
    pub fn list_sessions(&self) -> Result<Vec<String>, StoreError> {
        let mut sessions = Vec::new();
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(sessions),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            sessions.push(name);
        }
        sessions.sort();
        Ok(sessions)
    }

    fn latest_path(&self, session: &str) -> Result<Option<PathBuf>, StoreError> {
        Ok(self.yaml_files(session)?.into_iter().max())
    }

    /// YAML files of a session, lexicographically sorted (filenames
    /// embed timestamps, so this is creation order).
    fn yaml_files(&self, session: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.session_dir(session);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
