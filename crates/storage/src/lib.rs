// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muster-storage: Persistent JSON registries.
//!
//! Sessions, assignments, and the command palette persist as JSON files
//! under the OS user-config directory, partitioned by sanitized session
//! name and project key. Registries loaded with a mismatched project key
//! read as not-found, never as an error.

pub mod assignments;
pub mod palette;
pub mod paths;
pub mod registry;
pub mod sessions;

pub use assignments::{AssignmentRegistry, AssignmentStoreError};
pub use palette::{PaletteEntry, PaletteRegistry};
pub use paths::{config_root, normalize_project_key, sanitize_key};
pub use registry::{RegistryFile, StorageError};
pub use sessions::SessionRegistry;
