// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command palette persistence.
//!
//! Recently used orchestrator commands, most-recently-used first, capped.

use crate::paths::config_root;
use crate::registry::{RegistryFile, StorageError};
use serde::{Deserialize, Serialize};

/// Maximum entries kept on disk.
pub const PALETTE_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub label: String,
    pub command: String,
    pub last_used_ms: u64,
    pub use_count: u32,
}

/// The persisted command palette.
pub struct PaletteRegistry {
    file: RegistryFile<Vec<PaletteEntry>>,
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::open()
    }
}

impl PaletteRegistry {
    pub fn open() -> Self {
        Self {
            file: RegistryFile::new(config_root().join("palette").join("palette.json")),
        }
    }

    /// Entries, most-recently-used first.
    pub fn list(&self) -> Result<Vec<PaletteEntry>, StorageError> {
        let mut entries = self.file.load()?.unwrap_or_default();
        entries.sort_by(|a, b| b.last_used_ms.cmp(&a.last_used_ms));
        Ok(entries)
    }

    /// Record one use of a command, bumping its count and recency.
    pub fn record_use(
        &self,
        label: &str,
        command: &str,
        now_ms: u64,
    ) -> Result<(), StorageError> {
        let mut entries = self.list()?;
        match entries.iter_mut().find(|e| e.command == command) {
            Some(entry) => {
                entry.label = label.to_string();
                entry.last_used_ms = now_ms;
                entry.use_count += 1;
            }
            None => entries.push(PaletteEntry {
                label: label.to_string(),
                command: command.to_string(),
                last_used_ms: now_ms,
                use_count: 1,
            }),
        }
        entries.sort_by(|a, b| b.last_used_ms.cmp(&a.last_used_ms));
        entries.truncate(PALETTE_CAP);
        self.file.save(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_config_dir<T>(f: impl FnOnce() -> T) -> T {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("MUSTER_CONFIG_DIR", dir.path());
        let out = f();
        std::env::remove_var("MUSTER_CONFIG_DIR");
        out
    }

    #[test]
    #[serial_test::serial]
    fn records_and_orders_by_recency() {
        with_config_dir(|| {
            let palette = PaletteRegistry::open();
            palette.record_use("Assign work", "assign --strategy balanced", 1_000).unwrap();
            palette.record_use("Show status", "status", 2_000).unwrap();
            palette.record_use("Assign work", "assign --strategy balanced", 3_000).unwrap();

            let entries = palette.list().unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].command, "assign --strategy balanced");
            assert_eq!(entries[0].use_count, 2);
            assert_eq!(entries[1].command, "status");
        })
    }

    #[test]
    #[serial_test::serial]
    fn cap_drops_the_oldest() {
        with_config_dir(|| {
            let palette = PaletteRegistry::open();
            for i in 0..(PALETTE_CAP + 5) {
                palette
                    .record_use(&format!("cmd {}", i), &format!("run {}", i), i as u64)
                    .unwrap();
            }
            let entries = palette.list().unwrap();
            assert_eq!(entries.len(), PALETTE_CAP);
            // The oldest five fell off
            assert!(!entries.iter().any(|e| e.command == "run 0"));
            assert!(entries.iter().any(|e| e.command == "run 104"));
        })
    }
}
