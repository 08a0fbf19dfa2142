// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roster: name → pane registry with rebuilt reverse indices.
//!
//! Invariants: title → name is unique; non-empty pane ID → name is unique;
//! empty pane IDs are allowed (agent spawn pending). Reverse indices are
//! rebuilt from the forward map, never stored.

use crate::agent::PaneId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// A registry entry mapping a stable human-memorable name to a pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Human-memorable name, e.g. "GreenCastle"
    pub name: String,
    /// Pane title, e.g. `mysess__cc_1`
    pub title: String,
    /// Pane ID; empty while the spawn is pending
    #[serde(default)]
    pub pane_id: PaneId,
}

/// Errors from roster mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("agent name already registered: {0}")]
    DuplicateName(String),
    #[error("pane title already registered: {title} (held by {holder})")]
    DuplicateTitle { title: String, holder: String },
    #[error("pane already paired: {pane_id} (held by {holder})")]
    DuplicatePane { pane_id: String, holder: String },
    #[error("agent not found: {0}")]
    NotFound(String),
}

/// In-memory agent registry for one session.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    by_name: BTreeMap<String, AgentRecord>,
    by_title: HashMap<String, String>,
    by_pane: HashMap<PaneId, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from persisted records, enforcing uniqueness.
    pub fn from_records(records: Vec<AgentRecord>) -> Result<Self, RosterError> {
        let mut roster = Self::new();
        for record in records {
            roster.register(record)?;
        }
        Ok(roster)
    }

    /// Records in name order, for persistence.
    pub fn to_records(&self) -> Vec<AgentRecord> {
        self.by_name.values().cloned().collect()
    }

    /// Register a new agent. Fails on any uniqueness violation.
    pub fn register(&mut self, record: AgentRecord) -> Result<(), RosterError> {
        if self.by_name.contains_key(&record.name) {
            return Err(RosterError::DuplicateName(record.name));
        }
        if let Some(holder) = self.by_title.get(&record.title) {
            return Err(RosterError::DuplicateTitle {
                title: record.title,
                holder: holder.clone(),
            });
        }
        if !record.pane_id.is_empty() {
            if let Some(holder) = self.by_pane.get(&record.pane_id) {
                return Err(RosterError::DuplicatePane {
                    pane_id: record.pane_id.0,
                    holder: holder.clone(),
                });
            }
        }
        self.index(&record);
        self.by_name.insert(record.name.clone(), record);
        Ok(())
    }

    /// Re-pair an agent with a (possibly reused) pane.
    ///
    /// Clears any stale pairing another agent holds on the same pane; a
    /// pane hosts at most one agent.
    pub fn repair(&mut self, name: &str, pane_id: PaneId) -> Result<(), RosterError> {
        if !self.by_name.contains_key(name) {
            return Err(RosterError::NotFound(name.to_string()));
        }
        if !pane_id.is_empty() {
            if let Some(holder) = self.by_pane.get(&pane_id).cloned() {
                if holder != name {
                    if let Some(stale) = self.by_name.get_mut(&holder) {
                        stale.pane_id = PaneId::default();
                    }
                    self.by_pane.remove(&pane_id);
                }
            }
        }
        // Forward map first, then reindex the touched entries
        if let Some(record) = self.by_name.get_mut(name) {
            if !record.pane_id.is_empty() {
                self.by_pane.remove(&record.pane_id);
            }
            record.pane_id = pane_id.clone();
            if !pane_id.is_empty() {
                self.by_pane.insert(pane_id, name.to_string());
            }
        }
        Ok(())
    }

    /// Remove an agent on session teardown.
    pub fn remove(&mut self, name: &str) -> Result<AgentRecord, RosterError> {
        let record = self
            .by_name
            .remove(name)
            .ok_or_else(|| RosterError::NotFound(name.to_string()))?;
        self.by_title.remove(&record.title);
        if !record.pane_id.is_empty() {
            self.by_pane.remove(&record.pane_id);
        }
        Ok(record)
    }

    pub fn get(&self, name: &str) -> Option<&AgentRecord> {
        self.by_name.get(name)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&AgentRecord> {
        self.by_title.get(title).and_then(|n| self.by_name.get(n))
    }

    pub fn find_by_pane(&self, pane_id: &PaneId) -> Option<&AgentRecord> {
        self.by_pane.get(pane_id).and_then(|n| self.by_name.get(n))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn index(&mut self, record: &AgentRecord) {
        self.by_title
            .insert(record.title.clone(), record.name.clone());
        if !record.pane_id.is_empty() {
            self.by_pane
                .insert(record.pane_id.clone(), record.name.clone());
        }
    }
}

#[cfg(test)]
#[path = "roster_tests.rs"]
mod tests;
