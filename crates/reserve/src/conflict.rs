// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict resolution.
//!
//! Each file conflict offers four actions: wait out the holder's TTL,
//! request a handoff transfer via agent mail, force-release the holder's
//! reservation ids, or dismiss.

use muster_adapters::{
    Importance, MailClient, MailError, ReservationClient, ReservationError, SendMessage,
};
use muster_core::{Clock, ErrorCode, FileConflict};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How to resolve one conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictAction {
    /// Poll until the holder's reservation expires
    Wait { poll: Duration },
    /// Ask the holder for a reservation transfer
    Request,
    /// Release the holder's reservation ids
    Force,
    /// Drop the conflict without acting
    Dismiss,
}

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("conflict on {0} has no known expiry to wait for")]
    UnknownExpiry(String),
    #[error("wait cancelled")]
    Cancelled,
    #[error("mail: {0}")]
    Mail(#[from] MailError),
    #[error("reservation service: {0}")]
    Service(#[from] ReservationError),
}

impl ConflictError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConflictError::UnknownExpiry(_) => ErrorCode::Validation,
            ConflictError::Cancelled => ErrorCode::Cancelled,
            ConflictError::Mail(_) | ConflictError::Service(_) => ErrorCode::DependencyMissing,
        }
    }
}

/// Resolution executor for file conflicts.
pub struct ConflictBus<R: ReservationClient, L: MailClient, C: Clock> {
    project: String,
    sender: String,
    client: R,
    mail: L,
    clock: Arc<C>,
}

impl<R: ReservationClient, L: MailClient, C: Clock> ConflictBus<R, L, C> {
    pub fn new(project: &str, sender: &str, client: R, mail: L, clock: Arc<C>) -> Self {
        Self {
            project: project.to_string(),
            sender: sender.to_string(),
            client,
            mail,
            clock,
        }
    }

    /// Apply one action to one conflict. Dismiss always succeeds.
    pub async fn resolve(
        &self,
        conflict: &FileConflict,
        action: ConflictAction,
        cancel: &CancellationToken,
    ) -> Result<(), ConflictError> {
        match action {
            ConflictAction::Dismiss => Ok(()),
            ConflictAction::Wait { poll } => self.wait_out(conflict, poll, cancel).await,
            ConflictAction::Request => self.request_transfer(conflict).await,
            ConflictAction::Force => self.force_release(conflict).await,
        }
    }

    async fn wait_out(
        &self,
        conflict: &FileConflict,
        poll: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ConflictError> {
        if conflict.expires_at_ms.is_none() {
            return Err(ConflictError::UnknownExpiry(conflict.path.clone()));
        }
        loop {
            let now_ms = self.clock.epoch_ms();
            let remaining = conflict.time_remaining_ms(now_ms);
            if remaining == 0 {
                return Ok(());
            }
            let nap = poll.min(Duration::from_millis(remaining));
            tokio::select! {
                _ = cancel.cancelled() => return Err(ConflictError::Cancelled),
                _ = tokio::time::sleep(nap) => {}
            }
        }
    }

    async fn request_transfer(&self, conflict: &FileConflict) -> Result<(), ConflictError> {
        let body_md = format!(
            "`{requestor}` (pane {pane}) needs `{path}` which you currently hold.\n\n\
             Release it when you reach a stopping point, or include it in a \
             `reservation_transfer` block of your next handoff.",
            requestor = conflict.requestor_agent,
            pane = conflict.requestor_pane,
            path = conflict.path,
        );
        self.mail
            .send_message(SendMessage {
                project: self.project.clone(),
                sender: self.sender.clone(),
                to: conflict.holders.clone(),
                subject: format!("Reservation transfer request: {}", conflict.path),
                body_md,
                importance: Importance::High,
                ack_required: true,
            })
            .await?;
        Ok(())
    }

    async fn force_release(&self, conflict: &FileConflict) -> Result<(), ConflictError> {
        self.client
            .release(
                &self.project,
                &conflict.requestor_agent,
                &[],
                &conflict.holder_ids,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
