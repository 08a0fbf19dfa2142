// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muster-reserve: File reservations.
//!
//! Watches agent output for file edits, reserves touched paths through
//! the external reservation service, surfaces conflicts on a channel, and
//! moves reservations between agents with rollback on conflict.

pub mod conflict;
pub mod env;
pub mod extract;
pub mod transfer;
pub mod watcher;

pub use conflict::{ConflictAction, ConflictBus, ConflictError};
pub use extract::extract_paths;
pub use transfer::{
    transfer_reservations, TransferError, TransferReport, TransferRequest, TransferSpec,
};
pub use watcher::{start_watcher, ReservationWatcher, WatcherConfig};
