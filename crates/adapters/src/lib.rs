// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muster-adapters: Clients for the external collaborators.
//!
//! The multiplexer, agent-mail, reservation service, and beads triage are
//! external processes; each gets a trait-backed client here plus a fake
//! implementation (behind `test-support`) so the rest of the workspace can
//! be tested without any of them running.

pub mod bus;
pub mod env;
pub mod mail;
pub mod mux;
pub mod reservation;

pub mod beads;

pub use beads::{FileTriage, TriageClient, TriageError};
pub use bus::EventSender;
pub use mail::{Importance, MailClient, MailError, Message, NoopMail, SendMessage};
pub use mux::{MuxClient, MuxError, Pane, TmuxMux};
pub use reservation::{
    GrantedReservation, ReservationClient, ReservationConflict, ReservationError, ReserveOutcome,
};

#[cfg(any(test, feature = "test-support"))]
pub use beads::FakeTriage;
#[cfg(any(test, feature = "test-support"))]
pub use mail::FakeMail;
#[cfg(any(test, feature = "test-support"))]
pub use mux::FakeMux;
#[cfg(any(test, feature = "test-support"))]
pub use reservation::FakeReservations;
